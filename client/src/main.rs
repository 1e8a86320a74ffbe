use clap::Parser;
use client::network::{FlightClient, Identity};
use client::session::FlightData;
use log::info;
use shared::{default_world, ControlInput, FlightConfig, Skin, DEFAULT_ROOM};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Pilot name shown to other players
    #[arg(short, long, default_value = "Pilot")]
    name: String,

    /// Aircraft skin (default, crimson, azure, stealth, gold)
    #[arg(long, default_value = "default")]
    skin: String,

    /// Room to join
    #[arg(short, long, default_value = DEFAULT_ROOM)]
    room: String,

    /// Control sensitivity multiplier
    #[arg(long, default_value = "1.0")]
    sensitivity: f32,

    /// Invert the pitch axis
    #[arg(long)]
    inverted_look: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let skin = Skin::parse(&args.skin)
        .ok_or_else(|| format!("unknown skin {:?}", args.skin))?;
    let config = FlightConfig {
        sensitivity: args.sensitivity,
        inverted_look: args.inverted_look,
        ..FlightConfig::default()
    };
    let world = default_world(&mut rand::thread_rng());

    info!("Starting client...");
    info!("Connecting to: {} (room {:?})", args.server, args.room);

    let identity = Identity {
        name: args.name,
        skin,
        room: args.room,
    };
    let mut client = FlightClient::connect(&args.server, identity, config, world).await?;

    tokio::select! {
        result = client.run(demo_input) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    client.leave().await;

    Ok(())
}

/// Scripted autopilot standing in for the real input collaborator: full
/// throttle, rotate past 80, climb to cruise altitude and hold.
fn demo_input(data: &FlightData) -> ControlInput {
    let mut input = ControlInput {
        throttle_up: true,
        ..ControlInput::default()
    };

    if data.grounded {
        input.pitch_up = data.speed > 80.0;
    } else {
        input.pitch_up = data.altitude < 150.0 && data.pitch < 15.0;
        input.pitch_down = data.pitch > 20.0;
    }

    input
}
