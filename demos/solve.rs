use calcengine::{ops::Builtins, solve_equation_with, SolverOptions};
use std::io::{BufRead, BufReader};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ctx = Builtins::default();
    let options = SolverOptions::default();
    let stdin = std::io::stdin();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match solve_equation_with(line, &ctx, &options) {
            Ok(solution) if solution.roots.is_empty() => {
                println!("{}: no solutions", line);
            },
            Ok(solution) => {
                println!("{}:", line);
                for root in &solution.roots {
                    println!("  x = {}", root);
                }
            },
            Err(e) => eprintln!("Unable to solve \"{}\": {}", line, e),
        }
    }

    Ok(())
}
