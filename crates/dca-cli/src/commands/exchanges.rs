//! 지원 거래소 목록 명령어.

use dca_exchange::ExchangeId;

/// 지원 거래소 목록을 출력합니다.
pub fn print_exchanges() {
    println!("\n지원 거래소:");
    println!("{:<12} {:<12} {}", "ID", "이름", "REST URL");
    println!("{}", "-".repeat(50));
    for id in ExchangeId::ALL {
        println!("{:<12} {:<12} {}", id.as_str(), id.display_name(), id.rest_base_url());
    }
}
