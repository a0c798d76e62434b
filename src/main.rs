use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode,
    },
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::io::{BufWriter, stdout};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

mod effects;
mod screen;

use effects::Effect;

static STAR_COUNT: OnceLock<usize> = OnceLock::new();

pub fn star_count() -> usize {
    *STAR_COUNT.get().unwrap_or(&effects::sky::DEFAULT_STAR_COUNT)
}

fn print_usage() {
    eprintln!("starwand - A wizard's night sky with a firework wand");
    eprintln!();
    eprintln!("Usage: starwand [EFFECT] [OPTIONS]");
    eprintln!();
    eprintln!("Effects:");
    eprintln!("  show  Night sky plus the firework wand (default)");
    eprintln!("        Aim with the mouse, hold the left button to launch rockets");
    eprintln!("  sky   The starry night scene on its own");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --stars N  Number of stars scattered across the sky (default 200)");
    eprintln!();
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

// One update per rendered frame, paced to the usual animation-frame cadence.
const FRAME: Duration = Duration::from_micros(16_667);

fn run_effect<E: Effect>() -> std::io::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(
        stdout,
        EnterAlternateScreen,
        Hide,
        Clear(ClearType::All),
        EnableMouseCapture,
        EnableFocusChange
    )?;

    let (cols, rows) = terminal::size()?;
    let mut effect = E::new(cols as usize, rows as usize * 2);

    'frames: loop {
        let frame_start = Instant::now();

        // Drain everything the terminal queued up since the last frame;
        // pointer moves arrive in floods.
        while event::poll(Duration::from_millis(0))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break 'frames;
                    }
                    effect.handle_event(&event);
                }
                Event::Resize(cols, rows) => {
                    effect = E::new(*cols as usize, *rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => effect.handle_event(&event),
            }
        }

        effect.update();
        effect.render(&mut stdout)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }

    execute!(
        stdout,
        Show,
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal::disable_raw_mode()?;

    Ok(())
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut effect_name = "show";

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stars" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<usize>() {
                        Ok(n) => {
                            let _ = STAR_COUNT.set(n);
                            i += 2;
                        }
                        Err(_) => {
                            eprintln!("Invalid star count: {}", args[i + 1]);
                            std::process::exit(1);
                        }
                    }
                } else {
                    eprintln!("--stars requires a number");
                    std::process::exit(1);
                }
            }
            "help" | "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            arg => {
                if !arg.starts_with('-') {
                    effect_name = arg;
                    i += 1;
                } else {
                    eprintln!("Unknown option: {arg}");
                    eprintln!();
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
    }

    match effect_name {
        "show" => run_effect::<effects::fireworks::FireworksEffect>(),
        "sky" => run_effect::<effects::sky::SkyEffect>(),
        _ => {
            eprintln!("Unknown effect: {effect_name}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
