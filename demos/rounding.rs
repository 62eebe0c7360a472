use clap::Parser;
use pagemalloc::{SizeClass, round_up};

/// Prints the block size each request would be rounded to.
#[derive(Parser)]
struct Args {
  /// Request sizes in bytes.
  #[arg(default_values_t = [7, 16, 30, 50, 7, 100, 1000, 2047, 1999, 511])]
  sizes: Vec<usize>,
}

fn main() {
  let args = Args::parse();

  for size in args.sizes {
    let path = if SizeClass::for_request(size).is_some() {
      "size class"
    } else {
      "large object"
    };
    println!("Size: {:>8} -> {:>8} ({path})", size, round_up(size));
  }
}
