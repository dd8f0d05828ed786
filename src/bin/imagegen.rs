use std::process::exit;

use structopt::StructOpt;

use newtonox::painter::{IndexPainter, Painter};
use newtonox::{c, cr, FieldComputer};

#[derive(StructOpt)]
#[structopt(name = "newtonox-imagegen", about = "Render a Newton fractal to a PNG")]
struct Opt {
    #[structopt(long, default_value = "1920")]
    width: usize,

    #[structopt(long, default_value = "1080")]
    height: usize,

    /// Real part of the window center
    #[structopt(long, default_value = "0")]
    center_re: f64,

    /// Imaginary part of the window center
    #[structopt(long, default_value = "0")]
    center_im: f64,

    /// Complex-plane distance between adjacent pixels
    #[structopt(short, long, default_value = "0.01")]
    increment: f64,

    /// Newton cycles per pixel
    #[structopt(long, default_value = "25")]
    cycles: usize,

    /// Real polynomial coefficients, constant term first
    #[structopt(short, long, use_delimiter = true, default_value = "-1,0,1")]
    polynomial: Vec<f64>,

    #[structopt(short, long, default_value = "newton.png")]
    output: String,
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();

    let coeffs = opt.polynomial.iter().map(|&re| cr(re)).collect();
    let mut computer = FieldComputer::from_polynomial(
        coeffs,
        c(opt.center_re, opt.center_im),
        opt.increment,
        opt.width,
        opt.height,
        opt.cycles,
    )
    .unwrap_or_else(|e| {
        eprintln!("invalid configuration: {}", e);
        exit(1);
    });

    println!(
        "rendering {}x{} window at {} (increment {}, {} cycles, degree {})",
        computer.width(),
        computer.height(),
        computer.center(),
        computer.increment(),
        computer.cycles(),
        computer.polynomial().degree(),
    );

    let grid = computer.compute();
    let img = IndexPainter::default().paint(grid);
    img.save(&opt.output).expect("failed to save image");

    if let Some(d) = computer.diagnostics() {
        println!(
            "computed in {:.3}s ({:.3e} est. ops/s), wrote {}",
            d.elapsed_secs, d.ops_per_sec, opt.output
        );
    }
}
