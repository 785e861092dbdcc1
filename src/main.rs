fn main() {
    l2graph::cli::run();
}
