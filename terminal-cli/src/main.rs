use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use colorbet_execution::{
    draw::SeededDraw,
    current_period_id,
    history::{seed_history, DEFAULT_SEEDED_ROUNDS},
    local_now,
    round_scheduler::{PhaseConfig, RoundScheduler},
    views::{self, ResultRow},
    Event, Intent, Store,
};
use colorbet_types::{
    classify_result, format_countdown, format_inr, period_id, time_left_secs, BetChoice,
    ColorSet, DisplayStyle, GameMode, InvalidArgument, PeriodId, RoundPhase, Settings, Size, User,
};
use serde::Serialize;
use tokio::time;
use tracing::{info, warn};

mod config;

use config::{config_path, load_config, save_config, Overrides, ResolvedConfig};

const AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const WATCH_USER: &str = "local";

/// CLI flags (user-provided override persisted config)
#[derive(Parser, Debug)]
#[command(name = "colorbet", about = "Colorbet period calculator and round watcher")]
struct Args {
    /// Game mode: fast, std or pro
    #[arg(long, global = true)]
    mode: Option<GameMode>,

    /// Seed for drawn results
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Seconds before the boundary during which betting is closed
    #[arg(long, global = true)]
    lock_window: Option<u32>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log at DEBUG level
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the round that is live at an instant
    Period {
        /// Local time as "YYYY-MM-DD HH:MM:SS" (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Colours and size of a drawn digit
    Classify { digit: u32 },
    /// Seeded results of the rounds before now
    History {
        #[arg(long, default_value_t = DEFAULT_SEEDED_ROUNDS)]
        count: usize,
    },
    /// Run the round clock and print settlements
    Watch {
        /// Stop after this many rounds of the mode settle
        #[arg(long, default_value_t = 3)]
        rounds: u32,
        /// Bet on every round: a colour, big/small or a digit
        #[arg(long)]
        bet: Option<BetChoice>,
        #[arg(long)]
        amount: Option<u64>,
        /// Starting balance of the local player
        #[arg(long)]
        balance: Option<u64>,
    },
    /// Show the resolved configuration
    Config {
        /// Persist it for later runs
        #[arg(long)]
        save: bool,
    },
}

impl Args {
    fn overrides(&self) -> Overrides {
        let (bet_amount, starting_balance) = match &self.command {
            Command::Watch {
                amount, balance, ..
            } => (*amount, *balance),
            _ => (None, None),
        };
        Overrides {
            mode: self.mode,
            seed: self.seed,
            verbose: self.verbose,
            lock_window_secs: self.lock_window,
            bet_amount,
            starting_balance,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = ResolvedConfig::resolve(&args.overrides(), &load_config().unwrap_or_default());
    init_tracing(cfg.verbose)?;

    let phase_config = PhaseConfig::new(cfg.lock_window_secs);
    phase_config.validate().map_err(|err| anyhow!(err))?;
    let scheduler = RoundScheduler::new(phase_config);

    match args.command {
        Command::Period { at } => {
            let at = match at {
                Some(raw) => parse_at(&raw)?,
                None => local_now(),
            };
            let report = period_report(&scheduler, &at, cfg.mode);
            emit(args.json, &report, || report.to_string())
        }
        Command::Classify { digit } => {
            let report = classify_report(digit).context("cannot classify")?;
            emit(args.json, &report, || report.to_string())
        }
        Command::History { count } => {
            let seed = cfg.seed_or_random();
            info!(seed, count, mode = %cfg.mode, "seeding history");
            let mut source = SeededDraw::new(seed);
            let rows: Vec<ResultRow> = seed_history(&local_now(), cfg.mode, count, &mut source)
                .iter()
                .map(ResultRow::from)
                .collect();
            emit(args.json, &rows, || {
                rows.iter().map(render_row).collect::<Vec<_>>().join("\n")
            })
        }
        Command::Watch { rounds, bet, .. } => watch(&cfg, scheduler, rounds, bet, args.json).await,
        Command::Config { save } => {
            if save {
                match save_config(&cfg.to_persisted())? {
                    Some(path) => info!(path = %path.display(), "config saved"),
                    None => warn!("no config directory available; nothing saved"),
                }
            }
            emit(args.json, &cfg, || {
                let path = config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!(
                    "mode:          {}\nseed:          {}\nlock window:   {}s\nbet amount:    {}\nbalance:       {}\nverbose:       {}\nconfig file:   {path}",
                    cfg.mode,
                    cfg.seed.map_or_else(|| "random".to_string(), |s| s.to_string()),
                    cfg.lock_window_secs,
                    format_inr(cfg.bet_amount),
                    format_inr(cfg.starting_balance),
                    cfg.verbose,
                )
            })
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialise tracing: {err}"))
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn parse_at(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), AT_FORMAT)
        .with_context(|| format!("invalid --at {raw:?}, expected YYYY-MM-DD HH:MM:SS"))
}

#[derive(Debug, Serialize)]
struct PeriodReport {
    mode: GameMode,
    period_id: PeriodId,
    index: u32,
    time_left: u32,
    countdown: String,
    phase: RoundPhase,
    betting_open: bool,
    ends_at: NaiveDateTime,
}

impl std::fmt::Display for PeriodReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}  #{}  {} left  {:?}{}  ends {}",
            self.mode,
            self.period_id,
            self.index,
            self.countdown,
            self.phase,
            if self.betting_open { "" } else { " (betting closed)" },
            self.ends_at.format(AT_FORMAT),
        )
    }
}

fn period_report(scheduler: &RoundScheduler, at: &NaiveDateTime, mode: GameMode) -> PeriodReport {
    let id = period_id(at, mode);
    let time_left = time_left_secs(at, mode);
    PeriodReport {
        mode,
        index: id.index(),
        period_id: id,
        time_left,
        countdown: format_countdown(time_left),
        phase: scheduler.phase_at(at, mode),
        betting_open: scheduler.is_betting_open(at, mode),
        ends_at: scheduler.next_boundary(at, mode),
    }
}

#[derive(Debug, Serialize)]
struct ClassifyReport {
    digit: u8,
    colors: ColorSet,
    size: Size,
    style: DisplayStyle,
    css_class: &'static str,
}

impl std::fmt::Display for ClassifyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}  {}  {}  [{}]",
            self.digit, self.colors, self.size, self.css_class
        )
    }
}

fn classify_report(digit: u32) -> Result<ClassifyReport, InvalidArgument> {
    let number = u8::try_from(digit).map_err(|_| InvalidArgument::DigitOutOfRange(digit))?;
    let outcome = classify_result(number)?;
    let style = DisplayStyle::from(outcome.colors);
    Ok(ClassifyReport {
        digit: outcome.digit.get(),
        colors: outcome.colors,
        size: outcome.size,
        style,
        css_class: style.css_class(),
    })
}

fn render_row(row: &ResultRow) -> String {
    match (row.digit, row.colors, row.size) {
        (Some(digit), Some(colors), Some(size)) => {
            format!("{}  {digit}  {:<12} {size}", row.period_id, colors.to_string())
        }
        _ => format!("{}  pending", row.period_id),
    }
}

fn render_event(event: &Event) -> String {
    match event {
        Event::RoundSettled {
            mode,
            period_id,
            outcome,
        } => format!(
            "{mode} {period_id} -> {} {} {}",
            outcome.digit, outcome.colors, outcome.size
        ),
        Event::BetPlaced {
            period_id,
            amount,
            choice,
            ..
        } => format!("bet {} on {choice} for {period_id}", format_inr(*amount)),
        Event::BetSettled {
            bet_id,
            won,
            win_amount,
            ..
        } => {
            if *won {
                format!("{bet_id} won {}", format_inr(*win_amount))
            } else {
                format!("{bet_id} lost")
            }
        }
        Event::DepositRequested {
            transaction_id,
            amount,
        } => format!("{transaction_id} deposit of {} pending", format_inr(*amount)),
        Event::WithdrawalRequested {
            transaction_id,
            amount,
        } => format!("{transaction_id} withdrawal of {} pending", format_inr(*amount)),
        Event::ProfileUpdated { user_id } => format!("profile of {user_id} updated"),
    }
}

async fn watch(
    cfg: &ResolvedConfig,
    scheduler: RoundScheduler,
    rounds: u32,
    bet: Option<BetChoice>,
    json: bool,
) -> Result<()> {
    let seed = cfg.seed_or_random();
    let mode = cfg.mode;
    info!(seed, %mode, period = %current_period_id(mode), rounds, "watching");

    let mut store = Store::with_config(
        &local_now(),
        SeededDraw::new(seed),
        scheduler,
        Settings::default(),
        DEFAULT_SEEDED_ROUNDS,
    );
    if bet.is_some() {
        let user = User {
            balance: cfg.starting_balance,
            ..User::new(WATCH_USER.to_string(), "LOCAL1".to_string(), "Local".to_string())
        };
        store.register(user)?;
        store.sign_in(WATCH_USER)?;
    }

    let mut settled = 0;
    let mut last_bet: Option<PeriodId> = None;
    let mut interval = time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    while settled < rounds {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                warn!("interrupted");
                break;
            }
        }
        let now = local_now();
        let mut events = store.dispatch(Intent::Tick, &now)?;

        if let Some(choice) = bet {
            let view = views::game(store.state(), store.scheduler(), mode)
                .context("mode is not running")?;
            if view.betting_open && last_bet.as_ref() != Some(&view.period_id) {
                last_bet = Some(view.period_id.clone());
                let intent = Intent::PlaceBet {
                    mode,
                    amount: cfg.bet_amount,
                    choice,
                };
                match store.dispatch(intent, &now) {
                    Ok(placed) => events.extend(placed),
                    Err(err) => warn!(%err, "bet not placed"),
                }
            }
        }

        for event in &events {
            if matches!(event, Event::RoundSettled { mode: m, .. } if *m == mode) {
                settled += 1;
            }
            if json {
                println!("{}", serde_json::to_string(event)?);
            } else {
                println!("{}", render_event(event));
            }
        }
    }

    if let Some(user) = store.state().user() {
        let summary = views::profile(store.state()).context("signed-in user has a profile")?;
        println!(
            "balance {}  bets {}  wins {}  losses {}  p/l {}",
            format_inr(user.balance),
            user.total_bets,
            user.total_wins,
            user.total_loss,
            summary.profit_loss,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorbet_types::Color;

    fn at(raw: &str) -> NaiveDateTime {
        parse_at(raw).unwrap()
    }

    #[test]
    fn parses_period_with_global_mode() {
        let args = Args::parse_from([
            "colorbet",
            "period",
            "--mode",
            "pro",
            "--at",
            "2024-01-15 12:00:00",
        ]);
        assert_eq!(args.mode, Some(GameMode::Pro));
        assert!(matches!(args.command, Command::Period { at: Some(_) }));
    }

    #[test]
    fn parses_watch_overrides() {
        let args = Args::parse_from([
            "colorbet", "watch", "--rounds", "2", "--bet", "violet", "--amount", "50", "--seed",
            "7",
        ]);
        let overrides = args.overrides();
        assert_eq!(overrides.bet_amount, Some(50));
        assert_eq!(overrides.seed, Some(7));
        match args.command {
            Command::Watch { rounds, bet, .. } => {
                assert_eq!(rounds, 2);
                assert_eq!(bet, Some(BetChoice::Color(Color::Violet)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Args::try_parse_from(["colorbet", "period", "--mode", "turbo"]).is_err());
    }

    #[test]
    fn period_report_matches_calculator() {
        let scheduler = RoundScheduler::default();
        let report = period_report(&scheduler, &at("2024-01-15 12:00:27"), GameMode::Fast);
        assert_eq!(report.period_id.as_str(), "20240115F1440");
        assert_eq!(report.time_left, 3);
        assert_eq!(report.phase, RoundPhase::Locked);
        assert!(!report.betting_open);
        assert_eq!(report.ends_at, at("2024-01-15 12:00:30"));

        let report = period_report(&scheduler, &at("2024-01-15 00:00:00"), GameMode::Std);
        assert_eq!(report.period_id.as_str(), "20240115S0000");
        assert_eq!(report.countdown, "1:00");
    }

    #[test]
    fn parse_at_rejects_garbage() {
        assert!(parse_at("yesterday").is_err());
        assert!(parse_at("2024-02-30 00:00:00").is_err());
    }

    #[test]
    fn classify_report_bounds() {
        let report = classify_report(0).unwrap();
        assert_eq!(report.colors, ColorSet::RedViolet);
        assert_eq!(report.size, Size::Small);
        assert_eq!(classify_report(10).unwrap_err(), InvalidArgument::DigitOutOfRange(10));
        assert_eq!(classify_report(300).unwrap_err(), InvalidArgument::DigitOutOfRange(300));
    }

    #[test]
    fn renders_events() {
        let outcome = classify_result(7).unwrap();
        let line = render_event(&Event::RoundSettled {
            mode: GameMode::Fast,
            period_id: "20240115F1440".parse().unwrap(),
            outcome,
        });
        assert_eq!(line, "FAST 20240115F1440 -> 7 green big");
        let line = render_event(&Event::BetSettled {
            bet_id: "BET00000001".to_string(),
            user_id: WATCH_USER.to_string(),
            won: true,
            win_amount: 2_000,
        });
        assert_eq!(line, "BET00000001 won ₹2,000.00");
    }
}
