use std::process::exit;

fn main() {
    if let Err(e) = product_lister::app::run_cli() {
        eprintln!("error: {e}");
        exit(1);
    }
}
