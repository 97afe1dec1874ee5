fn main() {
    if let Err(err) = particle_box::app::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
