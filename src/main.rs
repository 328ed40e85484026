use std::io::{self, Write};

use miniforth::Forth;

fn to_quit(cmd: &str) -> bool {
    match cmd {
        "bye" | "quit" | "exit" => true,
        _ => false,
    }
}

fn main() {
    pretty_env_logger::init();

    let mut forth = Forth::new();

    loop {
        let mut input = String::new();

        print!("> ");
        io::stdout().flush().unwrap();

        match io::stdin().read_line(&mut input) {
            Ok(count) if count == 0 => {
                break;
            }
            Ok(_) => {
                let line = input.trim();
                if to_quit(line) {
                    println!("Bye!");
                    break;
                }
                match forth.eval(line) {
                    Ok(()) => println!("{}", forth.format_stack()),
                    Err(msg) => println!("Error: {}", msg),
                }
            }
            Err(msg) => {
                println!("Error: {}", msg);
                break;
            }
        }
    }
}
