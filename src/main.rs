use bar_optimizer::render;
use bar_optimizer::solver::Solver;
use bar_optimizer::stats;
use bar_optimizer::types::{DemandLine, Window};
use clap::Parser;

#[derive(Parser)]
#[command(name = "bar_optimizer", about = "1D cutting stock optimizer")]
struct Cli {
    /// Stock bar length (e.g. 1000 or 1000.5)
    #[arg(long)]
    stock: f64,

    /// Demanded cuts as length:qty (e.g. 600:4 200:5)
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// Saw kerf width (default: 0)
    #[arg(long, default_value_t = 0.0)]
    kerf: f64,

    /// Lower bound of the forbidden leftover band
    #[arg(long, requires = "max_leftover")]
    min_leftover: Option<f64>,

    /// Upper bound of the forbidden leftover band
    #[arg(long, requires = "min_leftover")]
    max_leftover: Option<f64>,

    /// Leftover length that still counts as reusable stock in the waste
    /// summary (default: 0)
    #[arg(long, default_value_t = 0.0)]
    allowance: f64,
}

fn parse_cut(s: &str) -> Result<DemandLine, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("invalid cut '{}', expected length:qty", s));
    }
    let length = parts[0]
        .parse::<f64>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let qty = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    Ok(DemandLine::new(length, qty))
}

fn main() {
    let cli = Cli::parse();

    let demand: Vec<DemandLine> = cli
        .cuts
        .iter()
        .map(|c| parse_cut(c))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let mut solver = Solver::new(cli.stock, cli.kerf, demand).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let (Some(min), Some(max)) = (cli.min_leftover, cli.max_leftover) {
        let window = Window::new(min, max).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        solver = solver.with_window(window).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
    }

    let solution = solver.solve();
    if solution.is_empty() {
        println!("No cutting plan satisfies the demand under the given constraints.");
        return;
    }

    print!("{}", render::render_solution(&solution, cli.stock));
    println!(
        "Summary: {} stock bar{}, {} piece{}, {} wasted",
        solution.total_stock_bars(),
        if solution.total_stock_bars() == 1 { "" } else { "s" },
        stats::total_pieces(&solution),
        if stats::total_pieces(&solution) == 1 { "" } else { "s" },
        stats::wasted_len(&solution, cli.stock, cli.allowance),
    );
}
