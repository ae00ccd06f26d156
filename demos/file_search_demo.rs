use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    topwords::example_apps::run_file_search_demo(std::env::args().skip(1))
}
