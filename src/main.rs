use anyhow::Result;
use clap::Parser;
use console::style;
use log::{info, warn};
use std::process::ExitCode;
use video_frame_sampler::cli::Cli;
use video_frame_sampler::component::FrameExtractor;
use video_frame_sampler::component::frame_extractor::{
    MediaToolkit, RunSummary, print_summary, write_report,
};
use video_frame_sampler::config::Config;
use video_frame_sampler::init;
use video_frame_sampler::signal::setup_shutdown_signal;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init::init(cli.verbose);
    let shutdown_signal = setup_shutdown_signal()?;

    let mut config = Config::new(cli.config.as_deref())?;
    cli.apply_overrides(&mut config.extraction);
    config.extraction.validate()?;
    info!("擷取設定: {:?}", config.extraction);

    let extractor = FrameExtractor::new(config, MediaToolkit::ffmpeg(), shutdown_signal);
    let results = extractor.run(&cli.input_dir, &cli.output_dir)?;

    let summary = RunSummary::from_results(&results);
    print_summary(&summary);

    if let Some(report_path) = &cli.report {
        write_report(report_path, &results)?;
        println!(
            "{} {}",
            style("報告已寫入:").dim(),
            report_path.display()
        );
    }

    if summary.is_success() {
        info!("程式正常結束");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("{} 部影片處理失敗", summary.failed);
        Ok(ExitCode::FAILURE)
    }
}
