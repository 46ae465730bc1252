use ratewave::error::AppResult;

fn main() -> AppResult<()> {
    ratewave::entry::run()
}
