//! Built-in port rankings used when no registry file is available.
//!
//! Ordered by open-frequency as published in the nmap-services database.

use super::RankedPort;

/// Most frequently open TCP ports, most popular first.
const TCP_PORTS: &[(u16, &str, f64)] = &[
    (80, "http", 0.484143),
    (23, "telnet", 0.221265),
    (443, "https", 0.208669),
    (21, "ftp", 0.197667),
    (22, "ssh", 0.182286),
    (25, "smtp", 0.131314),
    (3389, "ms-wbt-server", 0.083904),
    (110, "pop3", 0.077142),
    (445, "microsoft-ds", 0.056944),
    (139, "netbios-ssn", 0.050809),
    (143, "imap", 0.050420),
    (53, "domain", 0.048463),
    (135, "msrpc", 0.047798),
    (3306, "mysql", 0.045390),
    (8080, "http-proxy", 0.042052),
    (1723, "pptp", 0.031289),
    (111, "rpcbind", 0.030034),
    (995, "pop3s", 0.029921),
    (993, "imaps", 0.027199),
    (5900, "vnc", 0.023140),
    (1025, "NFS-or-IIS", 0.019952),
    (587, "submission", 0.019721),
    (8888, "sun-answerbook", 0.016451),
    (199, "smux", 0.015368),
    (1720, "h323q931", 0.014158),
    (465, "smtps", 0.013418),
    (548, "afp", 0.012943),
    (113, "ident", 0.012913),
    (81, "hosts2-ns", 0.012035),
    (6001, "X11:1", 0.011162),
    (10000, "snet-sensor-mgmt", 0.010593),
    (514, "shell", 0.010538),
    (5060, "sip", 0.010489),
    (179, "bgp", 0.010306),
    (1026, "LSA-or-nterm", 0.009880),
    (2000, "cisco-sccp", 0.009262),
    (8443, "https-alt", 0.009084),
    (8000, "http-alt", 0.008800),
    (32768, "filenet-tms", 0.008683),
    (554, "rtsp", 0.008414),
    (26, "rsftp", 0.007984),
    (1433, "ms-sql-s", 0.007929),
    (49152, "unknown", 0.007829),
    (2001, "dc", 0.007727),
    (515, "printer", 0.007677),
    (8008, "http", 0.006843),
    (49154, "unknown", 0.006767),
    (1027, "IIS", 0.006729),
    (5666, "nrpe", 0.006689),
    (646, "ldp", 0.006593),
    (5000, "upnp", 0.006580),
    (5631, "pcanywheredata", 0.006524),
    (631, "ipp", 0.006368),
    (49153, "unknown", 0.006262),
    (8081, "blackice-icecap", 0.006261),
    (2049, "nfs", 0.006235),
    (88, "kerberos-sec", 0.006141),
    (79, "finger", 0.006022),
    (5800, "vnc-http", 0.005994),
    (106, "pop3pw", 0.005950),
    (2121, "ccproxy-ftp", 0.005887),
    (1110, "nfsd-status", 0.005707),
    (49155, "unknown", 0.005700),
    (6000, "X11", 0.005694),
    (513, "login", 0.005570),
    (990, "ftps", 0.005525),
    (5357, "wsdapi", 0.005311),
    (427, "svrloc", 0.005255),
    (49156, "unknown", 0.005220),
    (543, "klogin", 0.005170),
    (544, "kshell", 0.005108),
    (5101, "admdog", 0.005047),
    (144, "news", 0.004942),
    (7, "echo", 0.004855),
    (389, "ldap", 0.004660),
    (8009, "ajp13", 0.004597),
    (3128, "squid-http", 0.004567),
    (444, "snpp", 0.004538),
    (9999, "abyss", 0.004454),
    (5009, "airport-admin", 0.004426),
    (7070, "realserver", 0.004275),
    (5190, "aol", 0.004267),
    (3000, "ppp", 0.004255),
    (5432, "postgresql", 0.004237),
    (1900, "upnp", 0.004162),
    (3986, "mapper-ws_ethd", 0.004153),
    (13, "daytime", 0.004098),
    (1029, "ms-lsa", 0.004082),
    (9, "discard", 0.004057),
    (5051, "ida-agent", 0.004048),
    (6646, "unknown", 0.004011),
    (49157, "unknown", 0.003990),
    (1028, "unknown", 0.003964),
    (873, "rsync", 0.003951),
    (1755, "wms", 0.003902),
    (2717, "pn-requester", 0.003872),
    (4899, "radmin", 0.003821),
    (9100, "jetdirect", 0.003816),
    (119, "nntp", 0.003759),
    (37, "time", 0.003744),
];

/// Most frequently open UDP ports, most popular first.
const UDP_PORTS: &[(u16, &str, f64)] = &[
    (631, "ipp", 0.450281),
    (161, "snmp", 0.433467),
    (137, "netbios-ns", 0.365163),
    (123, "ntp", 0.330879),
    (138, "netbios-dgm", 0.297830),
    (1434, "ms-sql-m", 0.293184),
    (445, "microsoft-ds", 0.253118),
    (135, "msrpc", 0.244452),
    (67, "dhcps", 0.228010),
    (53, "domain", 0.213496),
    (139, "netbios-ssn", 0.193194),
    (500, "isakmp", 0.163742),
    (68, "dhcpc", 0.140118),
    (520, "route", 0.139376),
    (1900, "upnp", 0.136543),
    (4500, "nat-t-ike", 0.124467),
    (514, "syslog", 0.119804),
    (49152, "unknown", 0.108303),
    (162, "snmptrap", 0.103947),
    (69, "tftp", 0.102228),
];

fn to_ranked(table: &[(u16, &str, f64)]) -> Vec<RankedPort> {
    table
        .iter()
        .map(|&(port, service, weight)| RankedPort::new(port, service, weight))
        .collect()
}

pub(super) fn tcp() -> Vec<RankedPort> {
    to_ranked(TCP_PORTS)
}

pub(super) fn udp() -> Vec<RankedPort> {
    to_ranked(UDP_PORTS)
}
