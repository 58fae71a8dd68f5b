use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpSocket;

/// File descriptors kept free for everything that is not a probe socket
pub const FD_HEADROOM: u64 = 64;

/// Open files needed to run `concurrency` probes at once
pub fn nofile_wanted(concurrency: usize) -> u64 {
    (concurrency as u64).saturating_add(FD_HEADROOM)
}

/// Largest concurrency, at most `concurrency`, that fits under an open-file
/// `limit` with headroom left over; never below one
pub fn concurrency_within_limit(concurrency: usize, limit: u64) -> usize {
    let room = limit.saturating_sub(FD_HEADROOM).max(1);
    (concurrency as u64).min(room) as usize
}

/// Create a non-blocking TCP socket for a probe connection.
///
/// `SO_LINGER` is zero: closing an established probe connection sends a
/// reset and leaves no `TIME_WAIT` entry on the local side.
pub fn create_connect_socket(addr: &SocketAddr) -> io::Result<TcpSocket> {
    let socket = Socket::new(Domain::for_address(*addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_nonblocking(true)?;
    socket.set_linger(Some(Duration::ZERO))?;

    let stream: std::net::TcpStream = socket.into();
    Ok(TcpSocket::from_std_stream(stream))
}

/// Whether an error comes from running out of local resources rather than
/// from the target (too many open files, no free ephemeral port, no buffers)
pub fn is_local_resource_error(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        matches!(
            err.raw_os_error(),
            Some(libc::EMFILE | libc::ENFILE | libc::EADDRNOTAVAIL | libc::ENOBUFS)
        )
    }
    #[cfg(not(unix))]
    {
        let _ = err;
        false
    }
}

/// Raise the soft open-file limit towards `wanted`, bounded by the hard limit.
///
/// Returns the soft limit in effect afterwards.
#[cfg(unix)]
pub fn raise_nofile_limit(wanted: u64) -> io::Result<u64> {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };

    // SAFETY: getrlimit only writes into the struct we pass
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0 {
        return Err(io::Error::last_os_error());
    }

    let target = (wanted as libc::rlim_t).min(limit.rlim_max);
    if target > limit.rlim_cur {
        limit.rlim_cur = target;
        // SAFETY: setrlimit only reads the struct we pass
        if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &limit) } != 0 {
            return Err(io::Error::last_os_error());
        }
    }

    Ok(limit.rlim_cur as u64)
}

#[cfg(not(unix))]
pub fn raise_nofile_limit(wanted: u64) -> io::Result<u64> {
    Ok(wanted)
}
