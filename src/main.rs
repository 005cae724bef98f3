use patterncounter::catch_fatal;

fn main() {
    catch_fatal!(
        {
            patterncounter::cli::run();
        },
        {
            std::process::exit(1);
        }
    );
}
