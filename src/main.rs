fn main() {
    if let Err(err) = branching_rs_editor::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
