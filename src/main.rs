#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::collections::HashSet;
#[cfg(feature = "std")]
use std::path::PathBuf;
#[cfg(feature = "std")]
use std::sync::Arc;

#[cfg(feature = "std")]
use battleroom::{
    init_logging, skeleton, transport::in_memory::InMemoryTransport, FileRepository,
    InMemoryRepository, PlayerId, RoomApi, RoomId, RoomService, RoomSettings, Skeleton, Stub,
    UserId, DEFAULT_MAP_SIZE,
};
#[cfg(feature = "std")]
use clap::{Parser, Subcommand};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::{Rng, SeedableRng};
#[cfg(feature = "std")]
use tokio::net::TcpListener;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[cfg(feature = "std")]
enum Commands {
    /// Host rooms for remote clients over TCP.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, help = "Persist rooms under this directory instead of memory")]
        data_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 300, help = "Seconds a client may stay silent")]
        idle_secs: u64,
    },
    /// Play a scripted match between random players in this process.
    Demo {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 2)]
        players: u64,
        #[arg(long, default_value_t = DEFAULT_MAP_SIZE)]
        map_size: usize,
    },
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            data_dir,
            idle_secs,
        } => {
            let listener = TcpListener::bind(&bind).await?;
            log::info!("listening on {}", bind);
            let idle = Duration::from_secs(idle_secs);
            match data_dir {
                Some(dir) => {
                    let service = Arc::new(RoomService::new(FileRepository::open(dir).await?));
                    skeleton::serve(listener, service, idle).await?;
                }
                None => {
                    let service = Arc::new(RoomService::new(InMemoryRepository::new()));
                    skeleton::serve(listener, service, idle).await?;
                }
            }
        }
        Commands::Demo {
            seed,
            players,
            map_size,
        } => {
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let mut rng = match seed {
                Some(s) => SmallRng::seed_from_u64(s),
                None => SmallRng::from_rng(&mut rand::rng()),
            };
            let (server_end, client_end) = InMemoryTransport::pair();
            let service = Arc::new(RoomService::new(InMemoryRepository::new()));
            let server = tokio::spawn(async move {
                let mut skeleton = Skeleton::new(service, server_end);
                skeleton.run().await
            });

            let client = Stub::new(client_end);
            run_demo(&client, &mut rng, players.max(2), map_size).await?;
            drop(client);
            server.await??;
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
async fn run_demo<A: RoomApi>(
    api: &A,
    rng: &mut SmallRng,
    players: u64,
    map_size: usize,
) -> anyhow::Result<()> {
    let users: Vec<UserId> = (1..=players).map(UserId).collect();
    let room: RoomId = api
        .create_room(users[0], RoomSettings::new("demo", map_size))
        .await?;

    let mut seats: Vec<(UserId, PlayerId)> = Vec::new();
    for &user in &users {
        let id = api.join_room(room, user, format!("player-{}", user)).await?;
        api.auto_place(room, user, Some(rng.random())).await?;
        seats.push((user, id));
    }
    let first = api.start_match(room, users[0]).await?;
    println!("Match started in room {}, player {} moves first", room, first);

    let mut fired: HashSet<(PlayerId, PlayerId, usize, usize)> = HashSet::new();
    let turn_limit = map_size * map_size * seats.len() * seats.len();
    for _ in 0..turn_limit {
        let view = api.room(room).await?;
        if let Some(winner) = view.summary.winner {
            println!("Player {} wins", winner);
            break;
        }
        let holder = view
            .turn_holder
            .ok_or_else(|| anyhow::anyhow!("no turn holder in a running match"))?;
        let user = seats
            .iter()
            .find(|(_, id)| *id == holder)
            .map(|(u, _)| *u)
            .ok_or_else(|| anyhow::anyhow!("unknown turn holder {}", holder))?;
        let targets: Vec<PlayerId> = view
            .players
            .iter()
            .filter(|p| p.on_game && p.id != holder)
            .map(|p| p.id)
            .collect();
        let victim = targets[rng.random_range(0..targets.len())];

        let pos = loop {
            let pos = (rng.random_range(0..map_size), rng.random_range(0..map_size));
            if fired.insert((holder, victim, pos.0, pos.1)) {
                break pos;
            }
        };
        let report = api.attack(room, user, victim, pos).await?;
        println!(
            "player {} -> player {} at ({}, {}): {:?}",
            holder, victim, pos.0, pos.1, report.outcome
        );
        if report.winner.is_none() {
            api.end_turn(room, user).await?;
        }
    }

    for (user, id) in &seats {
        let board = api.board(room, *user, None).await?;
        println!("\nFleet of player {}:", id);
        for row in board.cells {
            println!("{}", row.iter().map(|c| format!("{:>3}", c)).collect::<String>());
        }
    }
    Ok(())
}
