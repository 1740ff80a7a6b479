use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use camstream::{
    AudioProfile, AudioQuality, Collaborators, Credentials, PublisherConfig, ScreenLifecycle,
    SessionSettings, StreamController, VideoCodec,
};
use clap::Parser;

mod sim;

use sim::{ConsoleNotifier, SimClient, SimMedia, SimSurface};

#[derive(Parser)]
#[command(
    name = "camstream-sim",
    about = "Drive the stream controller through simulated screen lifecycle events"
)]
struct Args {
    /// Publish URL (rtsp://host:port/path)
    #[arg(long, short, default_value = camstream::config::DEFAULT_STREAM_URL)]
    url: String,

    #[arg(long, default_value = "")]
    username: String,

    #[arg(long, default_value = "")]
    password: String,

    /// Publish an AAC audio track alongside the video
    #[arg(long)]
    audio: bool,

    /// Camera preview rotation in degrees
    #[arg(long, default_value_t = 0)]
    orientation: u16,

    /// Number of resume/pause cycles to run
    #[arg(long, default_value_t = 2)]
    cycles: u32,

    /// How long the screen stays visible per cycle, in milliseconds
    #[arg(long, default_value_t = 1000)]
    hold_ms: u64,

    /// Simulated camera and network latency, in milliseconds
    #[arg(long, default_value_t = 200)]
    latency_ms: u64,

    /// Make the simulated server reject the publisher credentials
    #[arg(long)]
    reject_auth: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = PublisherConfig {
        stream_url: args.url.clone(),
        credentials: Credentials::new(args.username.clone(), args.password.clone()),
        session: SessionSettings {
            audio: if args.audio {
                AudioProfile::Aac(AudioQuality::default())
            } else {
                AudioProfile::None
            },
            video: VideoCodec::H264,
            preview_orientation: args.orientation,
        },
        ..PublisherConfig::default()
    };

    let latency = Duration::from_millis(args.latency_ms);
    let media = SimMedia { latency };
    let client = SimClient {
        latency,
        reject_credentials: args.reject_auth,
    };
    let surface = Arc::new(SimSurface::default());

    let mut screen = ScreenLifecycle::new(|| {
        StreamController::new(
            &config,
            Collaborators {
                media: &media,
                client: &client,
                surface: surface.clone(),
                notifier: Arc::new(ConsoleNotifier),
            },
        )
    });

    if let Err(e) = run(&mut screen, &surface, &args) {
        eprintln!("Simulation failed: {}", e);
        let _ = screen.on_destroy();
        return ExitCode::FAILURE;
    }

    match screen.on_destroy() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Teardown failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run<F>(
    screen: &mut ScreenLifecycle<F>,
    surface: &SimSurface,
    args: &Args,
) -> camstream::Result<()>
where
    F: FnMut() -> camstream::Result<StreamController>,
{
    let hold = Duration::from_millis(args.hold_ms);

    screen.on_create()?;
    println!("Publishing to {}", screen.controller()?.endpoint());

    for cycle in 1..=args.cycles {
        screen.on_resume()?;
        if cycle == 1 {
            // The surface usually shows up after the first resume.
            surface.create(640, 480);
        }
        thread::sleep(hold);
        let controller = screen.controller()?;
        println!(
            "cycle {cycle}: visible, state={:?}, bitrate={} B/s",
            controller.state(),
            controller.bitrate()
        );

        screen.on_pause()?;
        thread::sleep(hold / 2);
        println!("cycle {cycle}: hidden, state={:?}", screen.state());
    }
    Ok(())
}
