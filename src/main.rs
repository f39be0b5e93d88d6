#[actix_web::main]
async fn main() -> std::io::Result<()> {
    deal_pdf_service::run().await
}
