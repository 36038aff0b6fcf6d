/// Example: Start the terminal renderer with a pose already applied
///
/// Usage: cargo run --example fist -- [path/to/pose.txt]
use hand3d_core::{ChannelBank, Hand, PoseController, PoseScript};
use hand3d_terminal::TerminalApp;
use std::env;
use std::io;

const FIST: &str = "\
# every finger fully curled, thumb folded over
slider-thumb-joint1 = 30
slider-thumb-joint2 = 45
slider-index-joint1 = 45
slider-index-joint2 = 45
slider-index-joint3 = 45
slider-middle-joint1 = 45
slider-middle-joint2 = 45
slider-middle-joint3 = 45
slider-ring-joint1 = 45
slider-ring-joint2 = 45
slider-ring-joint3 = 45
slider-small-joint1 = 45
slider-small-joint2 = 45
slider-small-joint3 = 45
slider-wrist-bend = 15
";

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let script = match args.get(1) {
        Some(path) => {
            println!("Loading pose script: {}", path);
            PoseScript::load(path).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?
        }
        None => {
            eprintln!("No pose script provided, using the built-in fist...");
            PoseScript::parse(FIST).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?
        }
    };

    let mut hand = Hand::build();
    let mut bank = ChannelBank::new(&hand, PoseController::default());
    script.apply(&mut bank, &mut hand);

    println!("Applied {} slider events", script.entries.len());
    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(hand, bank)?;
    app.run()
}
