use sobel_edges::PipelineConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let output_path = sobel_edges::run(&PipelineConfig::default())?;
    println!("Wrote {}", output_path.display());

    Ok(())
}
