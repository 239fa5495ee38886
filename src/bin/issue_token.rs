//! Usage: issue_token <user_id> <display_name> <student|teacher|admin> [minutes]

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(user_id), Some(display_name), Some(role)) = (args.next(), args.next(), args.next())
    else {
        anyhow::bail!("usage: issue_token <user_id> <display_name> <role> [minutes]");
    };
    let minutes = args.next().map(|value| value.parse::<i64>()).transpose()?;

    let token = classquiz::issue_dev_token(&user_id, &display_name, &role, minutes)?;
    println!("{token}");
    Ok(())
}
