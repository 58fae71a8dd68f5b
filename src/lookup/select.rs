//! Picking one address when a host resolves to several.

use std::io::{BufRead, Write};
use std::net::IpAddr;

use crate::lookup::ResolveError;

/// Pick the scan address from `candidates`.
///
/// A single candidate is used as is. Otherwise `pick` (1-based) selects one,
/// and without it `prompt` is asked for a 1-based choice.
pub fn choose_address<F>(
    candidates: &[IpAddr],
    pick: Option<usize>,
    prompt: F,
) -> Result<IpAddr, ResolveError>
where
    F: FnOnce(&[IpAddr]) -> Result<usize, ResolveError>,
{
    let count = candidates.len();
    if count == 1 {
        return Ok(candidates[0]);
    }

    let choice = match pick {
        Some(choice) => choice,
        None => prompt(candidates)?,
    };

    if choice == 0 || choice > count {
        return Err(ResolveError::InvalidChoice { choice, count });
    }
    Ok(candidates[choice - 1])
}

/// List the candidates and ask until a valid number is entered
pub fn prompt_choice<R: BufRead, W: Write>(
    candidates: &[IpAddr],
    mut input: R,
    mut output: W,
) -> Result<usize, ResolveError> {
    for (i, ip) in candidates.iter().enumerate() {
        writeln!(output, "{}\t{}", i + 1, ip)?;
    }

    let count = candidates.len();
    let mut line = String::new();
    loop {
        write!(output, "choose [1-{}]: ", count)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(ResolveError::Prompt(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no address chosen",
            )));
        }

        if let Ok(choice) = line.trim().parse::<usize>() {
            if (1..=count).contains(&choice) {
                return Ok(choice);
            }
        }
    }
}

/// Interactive prompt on the controlling terminal
pub fn prompt_stdin(candidates: &[IpAddr]) -> Result<usize, ResolveError> {
    prompt_choice(candidates, std::io::stdin().lock(), std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn candidates() -> Vec<IpAddr> {
        vec![
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10)),
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7)),
        ]
    }

    fn never_prompt(_: &[IpAddr]) -> Result<usize, ResolveError> {
        panic!("prompt should not be shown");
    }

    #[test]
    fn test_single_candidate_skips_prompt() {
        let only = vec![IpAddr::V4(Ipv4Addr::LOCALHOST)];
        assert_eq!(choose_address(&only, None, never_prompt).unwrap(), only[0]);
    }

    #[test]
    fn test_pick_selects_without_prompt() {
        let list = candidates();
        assert_eq!(choose_address(&list, Some(3), never_prompt).unwrap(), list[2]);
    }

    #[test]
    fn test_pick_out_of_range() {
        let list = candidates();
        let result = choose_address(&list, Some(4), never_prompt);
        assert!(matches!(
            result,
            Err(ResolveError::InvalidChoice { choice: 4, count: 3 })
        ));
    }

    #[test]
    fn test_prompt_used_when_ambiguous() {
        let list = candidates();
        let chosen = choose_address(&list, None, |_| Ok(2)).unwrap();
        assert_eq!(chosen, list[1]);
    }

    #[test]
    fn test_prompt_repeats_until_valid() {
        let list = candidates();
        let input = b"0\nabc\n9\n2\n".as_slice();
        let mut output = Vec::new();

        let choice = prompt_choice(&list, input, &mut output).unwrap();
        assert_eq!(choice, 2);

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("1\t192.0.2.10\n2\t::1\n3\t198.51.100.7\n"));
        assert_eq!(text.matches("choose [1-3]: ").count(), 4);
    }

    #[test]
    fn test_prompt_eof_is_error() {
        let list = candidates();
        let result = prompt_choice(&list, b"".as_slice(), Vec::new());
        assert!(matches!(result, Err(ResolveError::Prompt(_))));
    }
}
