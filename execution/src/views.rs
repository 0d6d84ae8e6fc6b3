//! Read-only snapshots for the six screens.
//!
//! Every function here is a pure projection of an [`AppState`]; screens that
//! need a signed-in user return `None` when nobody is signed in.

use colorbet_types::{
    display_style, format_countdown, format_inr, mask_mobile, Bet, BetStatus, ColorSet,
    DisplayStyle, GameMode, GamePeriod, PeriodId, ReferralTier, RoundPhase, Size, Transaction,
    TransactionType, REFERRAL_TIERS,
};
use serde::Serialize;

use crate::{round_scheduler::RoundScheduler, store::AppState};

/// Results shown on the home screen strip.
pub const HOME_RESULTS: usize = 10;

/// Own bets listed under the betting panel.
pub const GAME_RECENT_BETS: usize = 5;

/// A settled (or pending) round as a badge or table row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub period_id: PeriodId,
    /// Last four characters of the period id.
    pub suffix: String,
    pub digit: Option<u8>,
    pub colors: Option<ColorSet>,
    pub size: Option<Size>,
    pub style: DisplayStyle,
}

impl From<&GamePeriod> for ResultRow {
    fn from(period: &GamePeriod) -> Self {
        Self {
            period_id: period.period_id.clone(),
            suffix: period.period_id.suffix().to_string(),
            digit: period.result_number(),
            colors: period.result_color(),
            size: period.result_size(),
            style: display_style(period.result_color()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HomeView {
    pub balance: String,
    pub uid: Option<String>,
    /// Latest FAST results, newest first.
    pub recent_results: Vec<ResultRow>,
}

pub fn home(state: &AppState) -> HomeView {
    let user = state.user();
    HomeView {
        balance: format_inr(user.map_or(0, |u| u.balance)),
        uid: user.map(|u| u.uid.clone()),
        recent_results: state
            .game(GameMode::Fast)
            .map(|game| {
                game.history
                    .iter()
                    .take(HOME_RESULTS)
                    .map(ResultRow::from)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameView {
    pub mode: GameMode,
    pub label: &'static str,
    pub period_id: PeriodId,
    pub time_left: u32,
    pub countdown: String,
    /// Share of the round still to run, 0..=1.
    pub progress: f64,
    pub urgent: bool,
    pub phase: RoundPhase,
    pub betting_open: bool,
    pub history: Vec<ResultRow>,
    pub my_bets: Vec<Bet>,
}

pub fn game(state: &AppState, scheduler: &RoundScheduler, mode: GameMode) -> Option<GameView> {
    let game = state.game(mode)?;
    let my_bets = match state.current_user.as_deref() {
        Some(user_id) => state
            .bets_of(user_id)
            .filter(|bet| bet.mode == mode)
            .take(GAME_RECENT_BETS)
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    Some(GameView {
        mode,
        label: mode.label(),
        period_id: game.current_period_id.clone(),
        time_left: game.time_left,
        countdown: format_countdown(game.time_left),
        progress: scheduler.progress(game.time_left, mode),
        urgent: scheduler.is_urgent(game.time_left),
        phase: game.phase,
        betting_open: scheduler.phase_for_time_left(game.time_left) == RoundPhase::Active,
        history: game.history.iter().map(ResultRow::from).collect(),
        my_bets,
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalletView {
    pub balance: String,
    pub transactions: Vec<Transaction>,
}

pub fn wallet(state: &AppState) -> Option<WalletView> {
    let user = state.user()?;
    Some(WalletView {
        balance: format_inr(user.balance),
        transactions: state.transactions_of(&user.id).cloned().collect(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReferView {
    pub promo_code: String,
    pub tiers: Vec<ReferralTier>,
}

pub fn refer(state: &AppState) -> Option<ReferView> {
    let user = state.user()?;
    Some(ReferView {
        promo_code: user.promo_code.clone(),
        tiers: REFERRAL_TIERS.to_vec(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BetsView {
    pub bets: Vec<Bet>,
}

pub fn bets(state: &AppState) -> Option<BetsView> {
    let user = state.user()?;
    Some(BetsView {
        bets: state.bets_of(&user.id).cloned().collect(),
    })
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileView {
    pub name: String,
    pub uid: String,
    pub email: String,
    pub mobile: String,
    pub avatar: Option<String>,
    /// Approved requests only.
    pub total_deposits: u64,
    pub total_withdrawals: u64,
    /// Bar widths in percent of the larger total.
    pub deposit_width: f64,
    pub withdrawal_width: f64,
    /// Settled bets only.
    pub total_bet_amount: u64,
    pub total_win_amount: u64,
    pub profit_loss: i128,
}

pub fn profile(state: &AppState) -> Option<ProfileView> {
    let user = state.user()?;
    let approved = |kind: TransactionType| -> u64 {
        state
            .transactions_of(&user.id)
            .filter(|tx| tx.kind == kind && tx.is_approved())
            .map(|tx| tx.amount)
            .fold(0u64, u64::saturating_add)
    };
    let total_deposits = approved(TransactionType::Deposit);
    let total_withdrawals = approved(TransactionType::Withdrawal);
    let scale = total_deposits.max(total_withdrawals).max(1) as f64;

    let (total_bet_amount, total_win_amount) = state
        .bets_of(&user.id)
        .filter(|bet| bet.status != BetStatus::Pending)
        .fold((0u64, 0u64), |(staked, won), bet| {
            (
                staked.saturating_add(bet.amount),
                won.saturating_add(bet.win_amount),
            )
        });

    Some(ProfileView {
        name: user.name.clone(),
        uid: user.uid.clone(),
        email: user.email.clone(),
        mobile: mask_mobile(&user.mobile),
        avatar: user.avatar.clone(),
        total_deposits,
        total_withdrawals,
        deposit_width: total_deposits as f64 / scale * 100.0,
        withdrawal_width: total_withdrawals as f64 / scale * 100.0,
        total_bet_amount,
        total_win_amount,
        profit_loss: total_win_amount as i128 - total_bet_amount as i128,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{at, create_store, create_user};
    use crate::store::Intent;
    use colorbet_types::{BetChoice, Color, TransactionStatus};

    #[test]
    fn test_home_signed_out() {
        let store = create_store(&at(12, 0, 0), &[0, 5, 2]);
        let view = home(store.state());
        assert_eq!(view.balance, "₹0.00");
        assert_eq!(view.uid, None);
        assert_eq!(view.recent_results.len(), HOME_RESULTS);
        let first = &view.recent_results[0];
        assert_eq!(first.suffix, "1439");
        assert_eq!(first.style, DisplayStyle::RedViolet);
    }

    #[test]
    fn test_home_json_shape() {
        let store = create_store(&at(12, 0, 0), &[5]);
        let json = serde_json::to_value(home(store.state())).unwrap();
        let first = &json["recent_results"][0];
        assert_eq!(first["period_id"], "20240115F1439");
        assert_eq!(first["digit"], 5);
        assert_eq!(first["colors"], serde_json::json!(["green", "violet"]));
        assert_eq!(first["size"], "big");
        assert_eq!(first["style"], "green_violet");
    }

    #[test]
    fn test_game_view_tracks_phase_and_bets() {
        let mut store = create_store(&at(12, 0, 0), &[3]);
        store.register(create_user("u1", 1_000)).unwrap();
        store.sign_in("u1").unwrap();
        for _ in 0..6 {
            store
                .dispatch(
                    Intent::PlaceBet {
                        mode: GameMode::Std,
                        amount: 10,
                        choice: BetChoice::Color(Color::Green),
                    },
                    &at(12, 0, 2),
                )
                .unwrap();
        }
        store.dispatch(Intent::Tick, &at(12, 0, 56)).unwrap();

        let view = game(store.state(), store.scheduler(), GameMode::Std).unwrap();
        assert_eq!(view.period_id.as_str(), "20240115S0720");
        assert_eq!(view.countdown, "0:04");
        assert!(view.urgent);
        assert!(!view.betting_open);
        assert_eq!(view.phase, RoundPhase::Locked);
        assert_eq!(view.my_bets.len(), GAME_RECENT_BETS);
        assert!((view.progress - 4.0 / 60.0).abs() < f64::EPSILON);

        let fast = game(store.state(), store.scheduler(), GameMode::Fast).unwrap();
        assert!(fast.my_bets.is_empty());
    }

    #[test]
    fn test_signed_in_views_need_user() {
        let store = create_store(&at(12, 0, 0), &[0]);
        assert!(wallet(store.state()).is_none());
        assert!(refer(store.state()).is_none());
        assert!(bets(store.state()).is_none());
        assert!(profile(store.state()).is_none());
    }

    #[test]
    fn test_refer_view() {
        let mut store = create_store(&at(12, 0, 0), &[0]);
        store.register(create_user("ab12", 0)).unwrap();
        store.sign_in("ab12").unwrap();
        let view = refer(store.state()).unwrap();
        assert_eq!(view.promo_code, "00AB12");
        let percents: Vec<u64> = view.tiers.iter().map(|t| t.percent()).collect();
        assert_eq!(percents, vec![40, 20, 10]);
    }

    #[test]
    fn test_profile_totals() {
        let mut store = create_store(&at(12, 0, 0), &[1]);
        store.register(create_user("u1", 1_000)).unwrap();
        store.sign_in("u1").unwrap();
        for choice in [BetChoice::Color(Color::Green), BetChoice::Color(Color::Red)] {
            store
                .dispatch(
                    Intent::PlaceBet {
                        mode: GameMode::Fast,
                        amount: 100,
                        choice,
                    },
                    &at(12, 0, 1),
                )
                .unwrap();
        }
        // Still pending; excluded from the totals.
        store
            .dispatch(
                Intent::PlaceBet {
                    mode: GameMode::Fast,
                    amount: 50,
                    choice: BetChoice::Color(Color::Red),
                },
                &at(12, 0, 31),
            )
            .unwrap();
        store
            .dispatch(
                Intent::RequestDeposit {
                    amount: 400,
                    utr: "UTR123456789".to_string(),
                },
                &at(12, 0, 32),
            )
            .unwrap();

        let mut state = store.state().clone();
        let pending = state.transactions[0].clone();
        state.transactions.push(Transaction {
            status: TransactionStatus::Approved,
            amount: 1_000,
            ..pending.clone()
        });
        state.transactions.push(Transaction {
            kind: TransactionType::Withdrawal,
            status: TransactionStatus::Approved,
            amount: 250,
            ..pending
        });

        let view = profile(&state).unwrap();
        assert_eq!(view.total_deposits, 1_000);
        assert_eq!(view.total_withdrawals, 250);
        assert_eq!(view.deposit_width, 100.0);
        assert_eq!(view.withdrawal_width, 25.0);
        assert_eq!(view.total_bet_amount, 200);
        assert_eq!(view.total_win_amount, 200);
        assert_eq!(view.profit_loss, 0);
        assert_eq!(view.mobile, "98******10");

        let wallet_view = wallet(&state).unwrap();
        assert_eq!(wallet_view.balance, "₹950.00");
        assert_eq!(wallet_view.transactions.len(), 3);
    }

    #[test]
    fn test_profile_widths_without_activity() {
        let mut store = create_store(&at(12, 0, 0), &[1]);
        store.register(create_user("u1", 0)).unwrap();
        store.sign_in("u1").unwrap();
        let view = profile(store.state()).unwrap();
        assert_eq!(view.deposit_width, 0.0);
        assert_eq!(view.withdrawal_width, 0.0);
        assert_eq!(view.profit_loss, 0);
    }
}
