use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    chatgate::cli::main()
}
