//! The state-owning store.
//!
//! Screens never mutate [`AppState`] themselves: they send an [`Intent`] to
//! [`Store::dispatch`] together with the current local time and read the
//! result back through [`crate::views`]. Every dispatch first brings the
//! rounds up to date with the clock, so a bet is always placed against the
//! round that is live at `now`.
//!
//! Settlement of a round happens on the first dispatch whose `now` falls in
//! a later bucket than the tracked round. If the clock jumps over several
//! rounds only the tracked one is settled; the skipped rounds had no bets.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use colorbet_types::{
    period_id, time_left_secs, validate_name, AccountInvariantError, Bet, BetChoice, BetStatus,
    GameError, GameMode, GamePeriod, GameState, InvalidArgument, Outcome, PeriodId, RoundPhase,
    Settings, Transaction, TransactionStatus, TransactionType, User, WithdrawalDetails,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tracing::{debug, info, warn};

use crate::{
    draw::ResultSource,
    history::{seed_history, DEFAULT_SEEDED_ROUNDS},
    round_scheduler::RoundScheduler,
};

/// Shortest accepted payment reference on a deposit.
pub const MIN_UTR_LENGTH: usize = 12;

/// Everything the screens can read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Id of the signed-in user.
    pub current_user: Option<String>,
    pub users: BTreeMap<String, User>,
    /// Newest first.
    pub bets: Vec<Bet>,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    pub games: BTreeMap<GameMode, GameState>,
    pub settings: Settings,
}

impl AppState {
    pub fn user(&self) -> Option<&User> {
        self.current_user
            .as_deref()
            .and_then(|id| self.users.get(id))
    }

    pub fn game(&self, mode: GameMode) -> Option<&GameState> {
        self.games.get(&mode)
    }

    /// Bets of one user, newest first.
    pub fn bets_of<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Bet> + 'a {
        self.bets.iter().filter(move |bet| bet.user_id == user_id)
    }

    /// Transactions of one user, newest first.
    pub fn transactions_of<'a>(
        &'a self,
        user_id: &'a str,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |tx| tx.user_id == user_id)
    }
}

/// A mutation request from a screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Only advance the clock.
    Tick,
    PlaceBet {
        mode: GameMode,
        amount: u64,
        choice: BetChoice,
    },
    RequestDeposit {
        amount: u64,
        utr: String,
    },
    RequestWithdraw {
        amount: u64,
        details: WithdrawalDetails,
    },
    /// `None` leaves a field unchanged.
    UpdateProfile {
        name: Option<String>,
        password: Option<String>,
        avatar: Option<String>,
    },
}

/// What changed during a dispatch, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RoundSettled {
        mode: GameMode,
        period_id: PeriodId,
        outcome: Outcome,
    },
    BetPlaced {
        bet_id: String,
        mode: GameMode,
        period_id: PeriodId,
        amount: u64,
        choice: BetChoice,
    },
    BetSettled {
        bet_id: String,
        user_id: String,
        won: bool,
        win_amount: u64,
    },
    DepositRequested {
        transaction_id: String,
        amount: u64,
    },
    WithdrawalRequested {
        transaction_id: String,
        amount: u64,
    },
    ProfileUpdated {
        user_id: String,
    },
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum StoreError {
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("account {0} is blocked")]
    AccountBlocked(String),
    #[error("betting is closed for {period_id} ({time_left}s left)")]
    BettingClosed { period_id: PeriodId, time_left: u32 },
    #[error("bet of {amount} is below the minimum of {min}")]
    BelowMinimum { amount: u64, min: u64 },
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u64, available: u64 },
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Account(#[from] AccountInvariantError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Argument(#[from] InvalidArgument),
}

pub struct Store<S> {
    state: AppState,
    scheduler: RoundScheduler,
    source: S,
    bet_seq: u64,
    transaction_seq: u64,
}

impl<S: ResultSource> Store<S> {
    /// A store whose rounds start at `now`, each mode preloaded with
    /// [`DEFAULT_SEEDED_ROUNDS`] settled rounds drawn from `source`.
    pub fn new(now: &NaiveDateTime, source: S) -> Self {
        Self::with_config(
            now,
            source,
            RoundScheduler::default(),
            Settings::default(),
            DEFAULT_SEEDED_ROUNDS,
        )
    }

    pub fn with_config(
        now: &NaiveDateTime,
        mut source: S,
        scheduler: RoundScheduler,
        settings: Settings,
        seeded_rounds: usize,
    ) -> Self {
        let games = GameMode::ALL
            .into_iter()
            .map(|mode| {
                let mut game =
                    GameState::new(mode, period_id(now, mode), time_left_secs(now, mode));
                game.phase = scheduler.phase_at(now, mode);
                game.history = seed_history(now, mode, seeded_rounds, &mut source);
                (mode, game)
            })
            .collect();
        Self {
            state: AppState {
                games,
                settings,
                ..Default::default()
            },
            scheduler,
            source,
            bet_seq: 0,
            transaction_seq: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn scheduler(&self) -> &RoundScheduler {
        &self.scheduler
    }

    /// Add or replace a user record.
    pub fn register(&mut self, user: User) -> Result<(), StoreError> {
        user.validate_invariants()?;
        self.state.users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn sign_in(&mut self, user_id: &str) -> Result<(), StoreError> {
        if !self.state.users.contains_key(user_id) {
            return Err(StoreError::InvalidRequest(format!("unknown user {user_id}")));
        }
        self.state.current_user = Some(user_id.to_string());
        Ok(())
    }

    pub fn sign_out(&mut self) {
        self.state.current_user = None;
    }

    /// Bring the rounds up to `now`, then apply `intent`.
    ///
    /// Rounds settled by the clock stay settled even when the intent itself
    /// is rejected; in that case their events are not returned.
    pub fn dispatch(
        &mut self,
        intent: Intent,
        now: &NaiveDateTime,
    ) -> Result<Vec<Event>, StoreError> {
        let mut events = self.sync_clock(now)?;
        let result = match intent {
            Intent::Tick => Ok(()),
            Intent::PlaceBet {
                mode,
                amount,
                choice,
            } => self.place_bet(mode, amount, choice, now, &mut events),
            Intent::RequestDeposit { amount, utr } => {
                self.request_deposit(amount, utr, now, &mut events)
            }
            Intent::RequestWithdraw { amount, details } => {
                self.request_withdraw(amount, details, now, &mut events)
            }
            Intent::UpdateProfile {
                name,
                password,
                avatar,
            } => self.update_profile(name, password, avatar, &mut events),
        };
        if let Err(err) = &result {
            warn!(%err, "intent rejected");
        }
        result.map(|()| events)
    }

    fn sync_clock(&mut self, now: &NaiveDateTime) -> Result<Vec<Event>, StoreError> {
        let mut events = Vec::new();
        for mode in GameMode::ALL {
            let Some(game) = self.state.games.get(&mode) else {
                continue;
            };
            let current = period_id(now, mode);
            let time_left = time_left_secs(now, mode);
            let tracked = game.current_period_id.clone();
            let phase = match current.cmp(&tracked) {
                Ordering::Greater => {
                    events.extend(self.settle_round(mode, tracked)?);
                    RoundPhase::Result
                }
                Ordering::Equal => self.scheduler.phase_for_time_left(time_left),
                // The clock stepped back into rounds that are already settled.
                // Keep the tracked round and hold betting until it is live.
                Ordering::Less => {
                    warn!(?mode, %current, %tracked, "clock behind tracked round");
                    RoundPhase::Locked
                }
            };
            if let Some(game) = self.state.games.get_mut(&mode) {
                if current > game.current_period_id {
                    game.current_period_id = current;
                }
                game.time_left = time_left;
                game.phase = phase;
            }
            debug!(?mode, time_left, ?phase, "tick");
        }
        Ok(events)
    }

    fn settle_round(
        &mut self,
        mode: GameMode,
        period_id: PeriodId,
    ) -> Result<Vec<Event>, StoreError> {
        let outcome = Outcome::of(self.source.draw(mode, &period_id));
        let mut period = GamePeriod::pending(period_id.clone());
        period.settle(outcome)?;
        if let Some(game) = self.state.games.get_mut(&mode) {
            game.push_history(period);
        }
        info!(
            %period_id,
            digit = outcome.digit.get(),
            colors = %outcome.colors,
            size = %outcome.size,
            "round settled"
        );

        let mut events = vec![Event::RoundSettled {
            mode,
            period_id: period_id.clone(),
            outcome,
        }];
        let settings = &self.state.settings;
        for bet in self
            .state
            .bets
            .iter_mut()
            .filter(|bet| bet.is_pending() && bet.period_id == period_id)
        {
            let payout = settings.payout(&bet.choice, bet.amount);
            let won = bet.settle(&outcome, payout)?;
            if let Some(user) = self.state.users.get_mut(&bet.user_id) {
                if won {
                    user.balance = user.balance.saturating_add(payout);
                    user.total_wins = user.total_wins.saturating_add(1);
                } else {
                    user.total_loss = user.total_loss.saturating_add(1);
                }
            }
            info!(bet_id = %bet.id, won, win_amount = bet.win_amount, "bet settled");
            events.push(Event::BetSettled {
                bet_id: bet.id.clone(),
                user_id: bet.user_id.clone(),
                won,
                win_amount: bet.win_amount,
            });
        }
        Ok(events)
    }

    fn signed_in_user(&mut self) -> Result<&mut User, StoreError> {
        let id = self
            .state
            .current_user
            .as_deref()
            .ok_or(StoreError::NotSignedIn)?;
        let user = self
            .state
            .users
            .get_mut(id)
            .ok_or(StoreError::NotSignedIn)?;
        if user.is_blocked {
            return Err(StoreError::AccountBlocked(user.uid.clone()));
        }
        Ok(user)
    }

    fn place_bet(
        &mut self,
        mode: GameMode,
        amount: u64,
        choice: BetChoice,
        now: &NaiveDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), StoreError> {
        let live = period_id(now, mode);
        let period_id = self
            .state
            .game(mode)
            .map(|game| game.current_period_id.clone())
            .ok_or_else(|| StoreError::InvalidRequest(format!("mode {mode} is not running")))?;
        let min = self.state.settings.min_bet;
        let open = self.scheduler.is_betting_open(now, mode) && live == period_id;

        let user = self.signed_in_user()?;
        if !open {
            return Err(StoreError::BettingClosed {
                period_id,
                time_left: time_left_secs(now, mode),
            });
        }
        if amount == 0 {
            return Err(StoreError::InvalidAmount);
        }
        if amount < min {
            return Err(StoreError::BelowMinimum { amount, min });
        }
        if amount > user.balance {
            return Err(StoreError::InsufficientBalance {
                needed: amount,
                available: user.balance,
            });
        }
        user.balance -= amount;
        user.total_bets = user.total_bets.saturating_add(1);
        let user_id = user.id.clone();

        self.bet_seq += 1;
        let bet = Bet {
            id: format!("BET{:08}", self.bet_seq),
            user_id,
            mode,
            period_id: period_id.clone(),
            amount,
            choice,
            status: BetStatus::Pending,
            win_amount: 0,
            placed_at: *now,
        };
        info!(bet_id = %bet.id, %period_id, amount, %choice, "bet placed");
        events.push(Event::BetPlaced {
            bet_id: bet.id.clone(),
            mode,
            period_id,
            amount,
            choice,
        });
        self.state.bets.insert(0, bet);
        Ok(())
    }

    fn request_deposit(
        &mut self,
        amount: u64,
        utr: String,
        now: &NaiveDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), StoreError> {
        let user = self.signed_in_user()?;
        if amount == 0 {
            return Err(StoreError::InvalidAmount);
        }
        let utr = utr.trim();
        if utr.len() < MIN_UTR_LENGTH || !utr.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StoreError::InvalidRequest(format!(
                "deposit needs a {MIN_UTR_LENGTH}-character UTR"
            )));
        }
        let (user_id, user_name) = (user.id.clone(), user.name.clone());
        let transaction = self.new_transaction(
            user_id,
            user_name,
            TransactionType::Deposit,
            amount,
            now,
        );
        let transaction = Transaction {
            utr: Some(utr.to_string()),
            ..transaction
        };
        info!(transaction_id = %transaction.id, amount, "deposit requested");
        events.push(Event::DepositRequested {
            transaction_id: transaction.id.clone(),
            amount,
        });
        self.state.transactions.insert(0, transaction);
        Ok(())
    }

    fn request_withdraw(
        &mut self,
        amount: u64,
        details: WithdrawalDetails,
        now: &NaiveDateTime,
        events: &mut Vec<Event>,
    ) -> Result<(), StoreError> {
        let user = self.signed_in_user()?;
        if amount == 0 {
            return Err(StoreError::InvalidAmount);
        }
        if amount > user.balance {
            return Err(StoreError::InsufficientBalance {
                needed: amount,
                available: user.balance,
            });
        }
        if !details.is_complete() {
            return Err(StoreError::InvalidRequest(format!(
                "incomplete {:?} details",
                details.method()
            )));
        }
        let (user_id, user_name) = (user.id.clone(), user.name.clone());
        let transaction = self.new_transaction(
            user_id,
            user_name,
            TransactionType::Withdrawal,
            amount,
            now,
        );
        let transaction = Transaction {
            withdrawal: Some(details),
            ..transaction
        };
        info!(transaction_id = %transaction.id, amount, "withdrawal requested");
        events.push(Event::WithdrawalRequested {
            transaction_id: transaction.id.clone(),
            amount,
        });
        self.state.transactions.insert(0, transaction);
        Ok(())
    }

    fn update_profile(
        &mut self,
        name: Option<String>,
        password: Option<String>,
        avatar: Option<String>,
        events: &mut Vec<Event>,
    ) -> Result<(), StoreError> {
        let user = self.signed_in_user()?;
        if let Some(name) = &name {
            validate_name(name)?;
        }
        if let Some(name) = name {
            user.name = name.trim().to_string();
        }
        if let Some(password) = password {
            user.password = Some(password).filter(|p| !p.is_empty());
        }
        if let Some(avatar) = avatar {
            user.avatar = Some(avatar).filter(|a| !a.is_empty());
        }
        info!(user_id = %user.id, "profile updated");
        events.push(Event::ProfileUpdated {
            user_id: user.id.clone(),
        });
        Ok(())
    }

    fn new_transaction(
        &mut self,
        user_id: String,
        user_name: String,
        kind: TransactionType,
        amount: u64,
        now: &NaiveDateTime,
    ) -> Transaction {
        self.transaction_seq += 1;
        Transaction {
            id: format!("TX{:08}", self.transaction_seq),
            user_id,
            user_name,
            kind,
            amount,
            status: TransactionStatus::Pending,
            date: *now,
            utr: None,
            withdrawal: None,
        }
    }
}
