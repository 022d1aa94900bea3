fn main() {
    if let Err(err) = wikistore::cli::run() {
        wikistore::ui::output::error(format!("{:#}", err));
        std::process::exit(1);
    }
}
