fn main() {
    if let Err(err) = flow_designer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
