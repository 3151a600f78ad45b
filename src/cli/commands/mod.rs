mod admin;
mod facility;
mod users;

pub use admin::cmd_create_admin;
pub use facility::{cmd_facility_add, cmd_facility_list};
pub use users::{cmd_users_approve, cmd_users_pending, cmd_users_reject};

/// Prints `prompt` and reads one trimmed line from stdin.
fn read_line(prompt: &str) -> anyhow::Result<String> {
    println!("{prompt}");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// y/N confirmation; anything but `y` cancels.
fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = read_line(&format!("{question} [y/N]"))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}
