//! Bracket service: loads documents, runs the bracket logic, commits one batch per operation.
//!
//! Every operation is read -> compute -> conditional commit. A lost optimistic
//! lock is retried from a fresh read up to `conflict_retries` times.

use crate::config::EngineConfig;
use crate::logic::{
    self, ensure_can_generate, generate_bracket, group_by_round, parse_roster_csv, BracketView,
    GeneratedBracket, ResultOutcome,
};
use crate::models::{
    MatchId, ParticipantRef, Tournament, TournamentError, TournamentFormat, TournamentId,
    TournamentStatus,
};
use crate::notify::{BracketEvent, NotificationSink};
use crate::store::{BracketStore, RosterProvider, WriteBatch};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;

pub struct BracketService<S> {
    store: Arc<S>,
    sink: Arc<dyn NotificationSink>,
    config: EngineConfig,
}

impl<S: BracketStore + RosterProvider> BracketService<S> {
    pub fn new(store: Arc<S>, sink: Arc<dyn NotificationSink>, config: EngineConfig) -> Self {
        Self {
            store,
            sink,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn rng(&self) -> StdRng {
        match self.config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn with_retries<T>(
        &self,
        op: &str,
        mut attempt: impl FnMut() -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(e) if e.is_retryable() && retries < self.config.conflict_retries => {
                    retries += 1;
                    log::warn!(
                        "{}: write conflict, retrying ({}/{})",
                        op,
                        retries,
                        self.config.conflict_retries
                    );
                }
                other => return other,
            }
        }
    }

    /// Create a tournament open for registration.
    pub fn create_tournament(
        &self,
        name: &str,
        format: TournamentFormat,
        max_participants: u32,
    ) -> Result<Tournament, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidState("tournament name is required"));
        }
        let tournament = Tournament::new(name, format, max_participants);
        let mut batch = WriteBatch::new();
        batch.create_tournament(tournament.clone());
        self.store.commit(batch)?;
        log::info!("Created tournament {} ({})", tournament.id, tournament.name);
        Ok(tournament)
    }

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        Ok(self.store.tournament(id)?.doc)
    }

    /// Operator status transition (registration-open -> upcoming -> live).
    pub fn set_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<Tournament, TournamentError> {
        self.with_retries("set_status", || {
            let read = self.store.tournament(id)?;
            let mut t = read.doc.clone();
            t.set_status(status)?;
            let mut batch = WriteBatch::new();
            batch.put_tournament(t.clone(), &read);
            self.store.commit(batch)?;
            log::info!("Tournament {} is now {:?}", id, status);
            Ok(t)
        })
    }

    /// Enroll one confirmed participant.
    pub fn enroll(
        &self,
        id: TournamentId,
        participant: ParticipantRef,
    ) -> Result<Tournament, TournamentError> {
        self.enroll_all(id, vec![participant])
    }

    /// Enroll every participant of a `username[,avatar_url]` CSV, or none of them.
    pub fn import_roster<R: io::Read>(
        &self,
        id: TournamentId,
        reader: R,
    ) -> Result<Tournament, TournamentError> {
        let participants = parse_roster_csv(reader)?;
        if participants.is_empty() {
            return Err(TournamentError::InvalidRoster("no participants in file".into()));
        }
        self.enroll_all(id, participants)
    }

    fn enroll_all(
        &self,
        id: TournamentId,
        participants: Vec<ParticipantRef>,
    ) -> Result<Tournament, TournamentError> {
        self.with_retries("enroll", || {
            let read = self.store.tournament(id)?;
            let roster = self.store.roster(id)?;
            let mut taken: HashSet<String> =
                roster.iter().map(|p| p.username.to_lowercase()).collect();

            let mut t = read.doc.clone();
            let mut batch = WriteBatch::new();
            for p in &participants {
                if !taken.insert(p.username.to_lowercase()) {
                    return Err(TournamentError::DuplicateParticipant(p.username.clone()));
                }
                t.register_participant()?;
                batch.enroll(id, p.clone());
            }
            batch.put_tournament(t.clone(), &read);
            self.store.commit(batch)?;
            log::info!(
                "Enrolled {} participant(s) in {} ({}/{})",
                participants.len(),
                id,
                t.current_participants,
                t.max_participants
            );
            Ok(t)
        })
    }

    /// Generate the single-elimination bracket. All-or-nothing; a second call
    /// fails with `InvalidState`.
    pub fn generate(&self, id: TournamentId) -> Result<GeneratedBracket, TournamentError> {
        let (tournament, generated) = self.with_retries("generate", || {
            let read = self.store.tournament(id)?;
            ensure_can_generate(&read.doc)?;
            let roster = self.store.roster(id)?;

            let mut t = read.doc.clone();
            let generated = generate_bracket(
                &mut t,
                &roster,
                self.config.bye_policy,
                &mut self.rng(),
                Utc::now(),
            )?;

            let mut batch = WriteBatch::new();
            batch.put_tournament(t.clone(), &read);
            for m in &generated.matches {
                batch.create_match(m.clone());
            }
            self.store.commit(batch)?;
            Ok((t, generated))
        })?;

        let byes = generated.matches.iter().filter(|m| m.is_bye()).count();
        log::info!(
            "Generated bracket for {}: {} participants, {} rounds, {} byes",
            id,
            tournament.current_participants,
            generated.total_rounds,
            byes
        );
        self.sink.notify(BracketEvent::BracketGenerated {
            tournament_id: id,
            total_rounds: generated.total_rounds,
        });
        if tournament.current_round > 1 {
            self.sink.notify(BracketEvent::RoundAdvanced {
                tournament_id: id,
                round: tournament.current_round,
            });
        }
        Ok(generated)
    }

    /// Record a score, create the next-round match when its feeders are both
    /// done, and finalize the tournament on the final.
    pub fn report_result(
        &self,
        match_id: MatchId,
        score_a: i64,
        score_b: i64,
    ) -> Result<ResultOutcome, TournamentError> {
        let (tournament, outcome) = self.with_retries("report_result", || {
            let tournament_id = self.store.game_match(match_id)?.doc.tournament_id;
            let read = self.store.tournament(tournament_id)?;
            let stored = self.store.matches(tournament_id)?;
            let versions: HashMap<MatchId, u64> =
                stored.iter().map(|m| (m.doc.id, m.version)).collect();
            let mut matches: Vec<_> = stored.into_iter().map(|m| m.doc).collect();

            let mut t = read.doc.clone();
            let outcome = logic::report_result(
                &mut t,
                &mut matches,
                match_id,
                score_a,
                score_b,
                Utc::now(),
            )?;

            let version = versions
                .get(&match_id)
                .copied()
                .ok_or(TournamentError::MatchNotFound(match_id))?;
            let mut batch = WriteBatch::new();
            // Always rewritten: the version bump serializes reports within a tournament.
            batch.put_tournament(t.clone(), &read);
            batch.put_match(outcome.updated.clone(), version);
            for m in &outcome.created {
                batch.create_match(m.clone());
            }
            self.store.commit(batch)?;
            Ok((t, outcome))
        })?;

        let m = &outcome.updated;
        log::info!(
            "Result recorded for {} round {} #{}: {:?}-{:?}",
            m.id,
            m.round,
            m.match_number,
            m.player_1_score,
            m.player_2_score
        );
        if let Some(winner_id) = m.winner_id {
            self.sink.notify(BracketEvent::MatchResultRecorded {
                tournament_id: tournament.id,
                match_id: m.id,
                winner_id,
            });
        }
        if outcome.round_advanced {
            log::info!("Tournament {} advanced to round {}", tournament.id, tournament.current_round);
            self.sink.notify(BracketEvent::RoundAdvanced {
                tournament_id: tournament.id,
                round: tournament.current_round,
            });
        }
        if let Some(winner_id) = outcome.champion {
            log::info!("Tournament {} completed, champion {}", tournament.id, winner_id);
            self.sink.notify(BracketEvent::TournamentCompleted {
                tournament_id: tournament.id,
                winner_id,
            });
        }
        Ok(outcome)
    }

    /// Round bookkeeping on demand; the tournament is only rewritten if `current_round` moved.
    pub fn advance_round(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let (t, advanced) = self.with_retries("advance_round", || {
            let read = self.store.tournament(id)?;
            let matches: Vec<_> = self.store.matches(id)?.into_iter().map(|m| m.doc).collect();
            let mut t = read.doc.clone();
            if !logic::advance_round(&mut t, &matches)? {
                return Ok((t, false));
            }
            let mut batch = WriteBatch::new();
            batch.put_tournament(t.clone(), &read);
            self.store.commit(batch)?;
            Ok((t, true))
        })?;
        if advanced {
            log::info!("Tournament {} advanced to round {}", id, t.current_round);
            self.sink.notify(BracketEvent::RoundAdvanced {
                tournament_id: id,
                round: t.current_round,
            });
        }
        Ok(t)
    }

    /// Tournament and its matches grouped by round.
    pub fn bracket(&self, id: TournamentId) -> Result<BracketView, TournamentError> {
        let tournament = self.store.tournament(id)?.doc;
        let matches = self.store.matches(id)?.into_iter().map(|m| m.doc).collect();
        Ok(BracketView {
            tournament,
            rounds: group_by_round(matches),
        })
    }
}
