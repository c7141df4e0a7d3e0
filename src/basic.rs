/// Single-lane linear scan, used as the oracle and performance baseline
pub fn sequential(data: &[u8], target: u8) -> u64 {
    let mut count = 0;
    for &item in data {
        if item == target {
            count += 1;
        }
    }
    count
}
