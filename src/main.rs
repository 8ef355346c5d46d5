use std::{env, process};

use rocks_lang::Lox;

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut lox = Lox::new();

    match args.len() {
        n if n > 2 => {
            eprintln!("Usage: rocks [script]");
            process::exit(64);
        }
        2 => lox.run_file(&args[1]),
        _ => lox.run_prompt(),
    }
}
