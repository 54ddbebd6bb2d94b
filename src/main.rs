//! Duel Forge - Main Binary
//!
//! Runs strategy-vs-strategy duels from the command line and inspects the
//! card catalog.

use clap::{Parser, Subcommand, ValueEnum};
use duel_forge_rs::{
    core::CardKind,
    game::{Difficulty, DuelState, OpponentStrategy, Side, VerbosityLevel},
    loader::{CardCatalog, DeckLoader},
    zones::CardPile,
    Result,
};
use std::path::PathBuf;

/// Difficulty tier for a strategy-driven seat
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Verbosity level (accepts names or numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Duel Forge - turn-based card duel engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a strategy-vs-strategy duel
    Run {
        /// Seat 1 difficulty
        #[arg(long, value_enum, default_value = "normal")]
        p1: DifficultyArg,

        /// Seat 2 difficulty
        #[arg(long, value_enum, default_value = "normal")]
        p2: DifficultyArg,

        /// Seat 1 name
        #[arg(long, default_value = "Player 1")]
        p1_name: String,

        /// Seat 2 name
        #[arg(long, default_value = "Player 2")]
        p2_name: String,

        /// Card catalog file (JSON); builtin set when omitted
        #[arg(long, value_name = "CATALOG_FILE")]
        catalog: Option<PathBuf>,

        /// Set random seed for deterministic duels
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum turns before calling the duel off
        #[arg(long, default_value_t = 200)]
        max_turns: u32,

        /// Verbosity level (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, short = 'v', default_value = "normal")]
        verbosity: VerbosityArg,
    },

    /// List the cards in the catalog
    Cards {
        /// Card catalog file (JSON); builtin set when omitted
        #[arg(long, value_name = "CATALOG_FILE")]
        catalog: Option<PathBuf>,
    },
}

fn load_catalog(path: Option<&PathBuf>) -> Result<CardCatalog> {
    let catalog = match path {
        Some(path) => CardCatalog::load_file(path)?,
        None => CardCatalog::builtin(),
    };
    for warning in &catalog.load_warnings {
        eprintln!("warning: {warning}");
    }
    Ok(catalog)
}

#[allow(clippy::too_many_arguments)]
fn run_duel(
    catalog: &CardCatalog,
    p1: Difficulty,
    p2: Difficulty,
    p1_name: &str,
    p2_name: &str,
    seed: Option<u64>,
    max_turns: u32,
    verbosity: VerbosityLevel,
) -> Result<()> {
    let mut state = DuelState::new(p1_name, p2_name, Side::Player, false);
    state.logger.set_verbosity(verbosity);
    if let Some(seed) = seed {
        state.seed_rng(seed);
    }

    for (side, difficulty) in [(Side::Player, p1), (Side::Opponent, p2)] {
        let list = if difficulty == Difficulty::Easy {
            DeckLoader::EASY_OPPONENT_DECK
        } else {
            DeckLoader::STARTER_DECK
        };
        let deck = DeckLoader::build(catalog, list)?;
        state.duelist_mut(side).deck = CardPile::from_cards(deck);
        state.shuffle_deck(side);
        state.duelist_mut(side).draw_initial_hand();
    }

    let seats = [
        OpponentStrategy::new(p1, Side::Player),
        OpponentStrategy::new(p2, Side::Opponent),
    ];
    while !state.ended && state.turn.turn_number <= max_turns {
        let seat = &seats[state.turn.active.index()];
        seat.take_turn(&mut state);
        if state.ended {
            break;
        }
        state.end_turn();
    }

    println!();
    match &state.outcome {
        Some(outcome) => {
            let winner = state.duelist_name(outcome.winner);
            println!("Winner: {winner} (after {} turns)", outcome.stats.turns);
        }
        None => println!("No winner after {max_turns} turns"),
    }
    println!(
        "Life points: {} {} - {} {}",
        state.duelist_name(Side::Player),
        state.duelist(Side::Player).life_points,
        state.duelist_name(Side::Opponent),
        state.duelist(Side::Opponent).life_points,
    );
    if let Some(mvp) = state.match_statistics().mvp_card {
        println!("Strongest fielded monster for {}: {mvp}", p1_name);
    }
    Ok(())
}

fn list_cards(catalog: &CardCatalog) {
    for card in catalog.iter() {
        match card.kind {
            CardKind::Monster => println!(
                "{:<22} monster  ATK {:<5} DEF {:<5} Lv {}  {}",
                card.name.as_str(),
                card.attack,
                card.defense,
                card.level,
                card.text
            ),
            CardKind::Spell => println!("{:<22} spell    {}", card.name.as_str(), card.text),
            CardKind::Trap => println!("{:<22} trap     {}", card.name.as_str(), card.text),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            p1,
            p2,
            p1_name,
            p2_name,
            catalog,
            seed,
            max_turns,
            verbosity,
        } => {
            let catalog = load_catalog(catalog.as_ref())?;
            run_duel(
                &catalog,
                p1.into(),
                p2.into(),
                &p1_name,
                &p2_name,
                seed,
                max_turns,
                verbosity.0,
            )?;
        }
        Commands::Cards { catalog } => {
            let catalog = load_catalog(catalog.as_ref())?;
            list_cards(&catalog);
        }
    }
    Ok(())
}
