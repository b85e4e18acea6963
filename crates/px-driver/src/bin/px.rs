fn main() -> std::process::ExitCode {
    px_driver::main()
}
