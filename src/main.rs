fn main() {
    gomacro::cli::run();
}
