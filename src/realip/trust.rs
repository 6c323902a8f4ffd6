use std::net::IpAddr;

use ipnet::IpNet;

/// Networks whose addresses are never accepted as the client address.
///
/// Built once from configuration and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct TrustSet {
    nets: Vec<IpNet>,
}

impl TrustSet {
    /// Parses every entry as CIDR, failing on the first invalid one.
    ///
    /// Entries with host bits set (`127.0.0.1/24`) denote their enclosing
    /// network. Duplicates and overlaps are kept as given.
    pub fn from_cidrs<S: AsRef<str>>(values: &[S]) -> anyhow::Result<Self> {
        let mut nets = Vec::with_capacity(values.len());
        for raw in values {
            let raw = raw.as_ref();
            let net: IpNet = raw
                .parse()
                .map_err(|err| anyhow::anyhow!("invalid excluded net {raw}: {err}"))?;
            nets.push(net);
        }
        Ok(Self { nets })
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn nets(&self) -> &[IpNet] {
        &self.nets
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        // `::ffff:a.b.c.d` must hit IPv4 ranges.
        let ip = ip.to_canonical();
        self.nets.iter().any(|net| net.contains(&ip))
    }
}
