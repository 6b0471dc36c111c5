//! rautoclock main entrypoint.

use rautoclock::run;
use rautoclock::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
