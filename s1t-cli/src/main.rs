use std::env;
use std::fs;
use std::io;
use std::io::Write;
use std::time::Instant;

use anyhow::Error;
use clap::App;
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use s1t::solve;
use s1t_dimacs::{write_solution, DimacsParser};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

pub fn main_with_err() -> Result<i32, Error> {
    let start_time = Instant::now();

    let matches = App::new("s1t")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .get_matches();

    // All diagnostics become DIMACS `c` comment lines on stdout.
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("S1T_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    let problem = DimacsParser::parse(file)?;

    info!(
        "Processing {} vars, {} clauses (parsed input in {:.6} s)",
        problem.spec.var_count,
        problem.spec.clause_count,
        start_time.elapsed().as_secs_f64()
    );

    let solution = solve(&problem);

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    write_solution(&mut stdout, &problem, &solution)?;

    // The duplicated var count is kept for compatibility with prior output.
    writeln!(
        stdout,
        "t {} {} {} {:.6}",
        problem.spec.format,
        problem.spec.var_count,
        problem.spec.var_count,
        start_time.elapsed().as_secs_f64()
    )?;

    Ok(0)
}
