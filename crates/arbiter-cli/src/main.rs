use std::env;
use std::net::SocketAddr;

use arbiter_api::{serve, EngineApi};
use contracts::{ImpactVector, Proposal, SessionConfig};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("arbiter-cli <command>");
    println!("commands:");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
    println!("  simulate <session_id> <seed> [rounds] [sqlite_path]");
    println!("    scripted self-play: player suggestions vs bribed counter-proposals,");
    println!("    deterministic per seed, provenance persisted to sqlite");
    println!("  suggest");
    println!("    print the stock policy suggestion catalog");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn parse_seed(value: Option<&String>) -> Result<u64, String> {
    let raw = value.ok_or_else(|| "missing seed".to_string())?;
    raw.parse::<u64>()
        .map_err(|_| format!("invalid seed: {raw}"))
}

fn default_sqlite_path() -> String {
    std::env::var("ARBITER_SQLITE_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "arbiter_sessions.sqlite".to_string())
}

fn parse_sqlite_path(value: Option<&String>) -> String {
    value
        .map(String::to_string)
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(default_sqlite_path)
}

/// SplitMix64-style mixing for scripted choices, so a rerun with the same
/// seed replays the exact same adversary behavior.
fn mix(seed: u64, turn: u64, salt: u64) -> u64 {
    let mut h = seed ^ salt.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    h = h.wrapping_add(turn.wrapping_mul(0xbf58_476d_1ce4_e5b9));
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^ (h >> 31)
}

struct AdversaryMove {
    actor_id: &'static str,
    target_department: &'static str,
    title: &'static str,
    description: &'static str,
    impact: (i32, i32, i32),
    base_bribe: u64,
}

const ADVERSARY_PLAYBOOK: &[AdversaryMove] = &[
    AdversaryMove {
        actor_id: "developer_group",
        target_department: "housing",
        title: "Fast-Track Waterfront Rezoning",
        description: "Waive environmental review for waterfront tower permits.",
        impact: (-15, 25, 5),
        base_bribe: 40_000,
    },
    AdversaryMove {
        actor_id: "fossil_fuel_lobby",
        target_department: "energy",
        title: "Gas Peaker Capacity Expansion",
        description: "Lock in two decades of natural gas peaker capacity.",
        impact: (-20, 20, -5),
        base_bribe: 60_000,
    },
];

fn run_simulation(args: &[String]) -> Result<(), String> {
    let session_id = args
        .get(2)
        .cloned()
        .ok_or_else(|| "missing session_id".to_string())?;
    let seed = parse_seed(args.get(3))?;
    let rounds = args
        .get(4)
        .map(|value| {
            value
                .parse::<u32>()
                .map_err(|_| format!("invalid rounds: {value}"))
        })
        .transpose()?
        .unwrap_or(25);
    let sqlite_path = parse_sqlite_path(args.get(5));

    let config = SessionConfig {
        session_id: session_id.clone(),
        seed,
        max_turns: rounds.max(1),
        ..SessionConfig::default()
    };

    let mut api = EngineApi::from_config(config).map_err(|err| err.to_string())?;
    api.attach_sqlite_store(&sqlite_path)
        .map_err(|err| format!("failed to attach sqlite store: {err}"))?;
    api.initialize_session_storage(true)
        .map_err(|err| format!("failed to initialize session storage: {err}"))?;

    while !api.state().is_game_over {
        let turn = api.state().turn_number;

        let suggestions = api.suggestions();
        let pick = (mix(seed, u64::from(turn), 1) % suggestions.len() as u64) as usize;
        api.submit_proposal(suggestions[pick].clone())
            .map_err(|err| err.to_string())?;

        for (index, adversary) in ADVERSARY_PLAYBOOK.iter().enumerate() {
            let bribe =
                adversary.base_bribe + mix(seed, u64::from(turn), index as u64 + 2) % 120_000;
            let (sustainability, economic, political) = adversary.impact;
            let proposal = Proposal::new(
                format!("lobby_t{turn}_{}", adversary.actor_id),
                adversary.actor_id,
                adversary.target_department,
                adversary.title,
                adversary.description,
                ImpactVector::new(sustainability, economic, political),
                turn,
            )
            .with_bribe(bribe);
            api.submit_proposal(proposal).map_err(|err| err.to_string())?;
        }

        let (decision, state) = api.resolve_round().map_err(|err| err.to_string())?;
        let winner = decision
            .winning_proposal_id
            .as_deref()
            .unwrap_or("no_action");
        println!(
            "turn={} winner={} index={:.1} mayor_trust={:.1} bad_actor_influence={:.1}",
            decision.turn,
            winner,
            state.city_stats.city_index,
            state.city_stats.mayor_trust,
            state.city_stats.bad_actor_influence,
        );
    }

    if let Some(error) = api.last_persistence_error() {
        return Err(format!("persistence error after simulation: {error}"));
    }

    let state = api.state();
    println!(
        "simulated session_id={} seed={} turns={} outcome={:?} sqlite={}",
        session_id,
        seed,
        state.turn_number,
        state.outcome,
        sqlite_path
    );
    Ok(())
}

fn print_suggestions() -> Result<(), String> {
    let api = EngineApi::from_config(SessionConfig::default()).map_err(|err| err.to_string())?;
    for proposal in api.suggestions() {
        println!(
            "{}: {} (sustainability {:+}, economic {:+}, political {:+})",
            proposal.target_department,
            proposal.title,
            proposal.impact.sustainability,
            proposal.impact.economic,
            proposal.impact.political,
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let result = match command {
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => serve(addr).await.map_err(|err| err.to_string()),
            Err(err) => Err(err),
        },
        Some("simulate") => run_simulation(&args),
        Some("suggest") => print_suggestions(),
        _ => {
            print_usage();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
