#[macro_use]
extern crate clap;

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process;

use clap::{App, AppSettings, Arg};
use log::debug;

use ippvm::{Interpreter, Outcome};

const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 10;
const EXIT_INPUT_FILE: i32 = 11;

fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("interpret")
        .version(crate_version!())
        .author(crate_authors!())
        .about("Interprets XML representations of IPPcode23 programs.")
        .setting(AppSettings::DisableVersion)
        .arg(
            Arg::with_name("source")
                .short("s")
                .long("source")
                .takes_value(true)
                .value_name("FILE")
                .help("Read the program document from FILE instead of standard input"),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("FILE")
                .help("Read guest input from FILE instead of standard input"),
        )
}

fn main() {
    env_logger::init();

    // Help must stand alone; clap would happily combine it with other
    // arguments.
    let args: Vec<String> = env::args().collect();
    if args.iter().skip(1).any(|arg| arg == "-h" || arg == "--help") {
        if args.len() != 2 {
            eprintln!("error: -h/--help cannot be combined with other arguments");
            process::exit(EXIT_USAGE);
        }
        let _ = build_app().print_help();
        println!();
        process::exit(EXIT_OK);
    }

    let matches = match build_app().get_matches_safe() {
        Ok(matches) => matches,
        Err(err) => {
            eprintln!("{}", err.message);
            process::exit(EXIT_USAGE);
        }
    };

    let source = matches.value_of("source");
    let input = matches.value_of("input");
    if source.is_none() && input.is_none() {
        eprintln!("error: at least one of --source and --input must be given");
        process::exit(EXIT_USAGE);
    }

    let program = {
        let reader: Box<dyn BufRead> = match source {
            Some(path) => Box::new(BufReader::new(open_file(path))),
            None => Box::new(BufReader::new(io::stdin())),
        };
        match ippxml::load(reader) {
            Ok(program) => program,
            Err(err) => {
                eprintln!("error: {}", err);
                process::exit(err.code());
            }
        }
    };

    let guest_input: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(open_file(path))),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut interpreter = Interpreter::new(
        guest_input,
        Box::new(io::stdout()),
        Box::new(io::stderr()),
    );
    match interpreter.run(&program) {
        Ok(Outcome::Completed) => {
            debug!("program completed");
            process::exit(EXIT_OK);
        }
        Ok(Outcome::Exited(code)) => process::exit(code),
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(err.code());
        }
    }
}

fn open_file(path: &str) -> File {
    match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("error: cannot open {}: {}", path, err);
            process::exit(EXIT_INPUT_FILE);
        }
    }
}
