fn main() {
    if let Err(err) = sheet_managed::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
