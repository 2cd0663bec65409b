fn main() -> std::process::ExitCode {
    notion_todos_lib::run()
}
