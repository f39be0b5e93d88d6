use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match deal_pdf_service::run_once().await {
        Ok(outcome) => {
            println!("OK pdfUrl: {}", outcome.pdf_url);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("PDF generation failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
