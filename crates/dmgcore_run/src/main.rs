use std::path::PathBuf;
use std::process::ExitCode;

use dmgcore_run::Verdict;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(rom_path) = args.next().map(PathBuf::from) else {
        eprintln!(
            "No ROM path provided.\n\
             Usage: dmgcore_run <rom> [frames]"
        );
        return ExitCode::FAILURE;
    };
    let frame_arg = args.next();

    let result = dmgcore_run::frame_budget(frame_arg.as_deref())
        .and_then(|frames| dmgcore_run::run_path(&rom_path, frames));

    match result {
        Ok(outcome) => {
            print!("{}", outcome.serial);
            if !outcome.serial.ends_with('\n') {
                println!();
            }
            match outcome.verdict {
                Verdict::Passed => ExitCode::SUCCESS,
                Verdict::Failed | Verdict::Timeout => {
                    log::warn!("'{}': {:?}", rom_path.display(), outcome.verdict);
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
