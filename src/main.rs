fn main() {
    if let Err(e) = hushkey::run() {
        eprintln!("hushkey failed to start: {}", e);
        std::process::exit(1);
    }
}
