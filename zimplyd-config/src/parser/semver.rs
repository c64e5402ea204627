pub fn serialize<S: serde::Serializer>(
    value: &semver::VersionReq,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<semver::VersionReq, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let requirement = <String as serde::Deserialize>::deserialize(deserializer)?;
    semver::VersionReq::parse(&requirement).map_err(|e| {
        serde::de::Error::custom(format!("invalid version requirement '{requirement}': {e}"))
    })
}
