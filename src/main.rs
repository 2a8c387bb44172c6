fn main() {
    if let Err(err) = bubblemap::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
