//! DASH manifest (MPD) parsing.
//!
//! Only segment addressing is read: `Period/AdaptationSet/Representation`
//! and the `SegmentTemplate` that applies to each representation.

use crate::error::{Error, ManifestError};
use crate::representation::Representation;
use roxmltree::Node;
use std::collections::HashSet;
use std::path::Path;

/// XML namespace of DASH MPD documents.
pub const MPD_NAMESPACE: &str = "urn:mpeg:dash:schema:mpd:2011";

/// Parse a manifest file from disk.
pub fn parse_file(path: &Path) -> crate::Result<Vec<Representation>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(parse(&text)?)
}

/// Parse manifest text into representations, in document order.
///
/// Handles manifests such as:
/// ```xml
/// <MPD xmlns="urn:mpeg:dash:schema:mpd:2011">
///   <Period>
///     <AdaptationSet contentType="video">
///       <SegmentTemplate initialization="init-stream$RepresentationID$.m4s"
///                        media="chunk-stream$RepresentationID$-$Number%05d$.m4s"
///                        startNumber="1"/>
///       <Representation id="0" bandwidth="8000000"/>
///     </AdaptationSet>
///   </Period>
/// </MPD>
/// ```
pub fn parse(text: &str) -> Result<Vec<Representation>, ManifestError> {
    let doc = roxmltree::Document::parse(text.trim_start())?;

    let root = doc.root_element();
    if !root.has_tag_name((MPD_NAMESPACE, "MPD")) {
        return Err(ManifestError::UnexpectedRoot {
            namespace: MPD_NAMESPACE,
            found: root.tag_name().name().to_string(),
        });
    }

    let mut representations = Vec::new();
    let mut seen = HashSet::new();

    for period in children(root, "Period") {
        for adaptation in children(period, "AdaptationSet") {
            for node in children(adaptation, "Representation") {
                let rep = parse_representation(node, adaptation, representations.len())?;

                if !seen.insert(rep.id) {
                    return Err(ManifestError::DuplicateId { id: rep.id });
                }

                tracing::debug!("Parsed representation {}", rep.describe());
                representations.push(rep);
            }
        }
    }

    if representations.is_empty() {
        return Err(ManifestError::NoRepresentations);
    }

    Ok(representations)
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name((MPD_NAMESPACE, name)))
}

fn parse_representation<'a, 'input>(
    node: Node<'a, 'input>,
    adaptation: Node<'a, 'input>,
    index: usize,
) -> Result<Representation, ManifestError> {
    let raw_id = node
        .attribute("id")
        .ok_or(ManifestError::MissingId { index })?;

    // Representation-level template wins; the adaptation set fills the gaps
    let own = children(node, "SegmentTemplate").next();
    let inherited = children(adaptation, "SegmentTemplate").next();
    if own.is_none() && inherited.is_none() {
        return Err(ManifestError::MissingSegmentTemplate {
            id: raw_id.to_string(),
        });
    }

    let template_attr = |name: &str| {
        own.and_then(|t| t.attribute(name))
            .or_else(|| inherited.and_then(|t| t.attribute(name)))
    };

    let id: u32 = raw_id
        .trim()
        .parse()
        .map_err(|_| ManifestError::InvalidAttribute {
            id: raw_id.to_string(),
            attribute: "id",
            value: raw_id.to_string(),
        })?;

    let initialization =
        template_attr("initialization").ok_or_else(|| ManifestError::MissingAttribute {
            id: raw_id.to_string(),
            attribute: "initialization",
        })?;

    let media = template_attr("media").ok_or_else(|| ManifestError::MissingAttribute {
        id: raw_id.to_string(),
        attribute: "media",
    })?;

    let start_number = match template_attr("startNumber") {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(n) if n >= 1 => n,
            _ => {
                return Err(ManifestError::InvalidAttribute {
                    id: raw_id.to_string(),
                    attribute: "startNumber",
                    value: value.to_string(),
                })
            }
        },
        None => 1,
    };

    let inherited_attr = |name: &str| {
        node.attribute(name)
            .or_else(|| adaptation.attribute(name))
            .map(|s| s.to_string())
    };

    let mut rep = Representation::new(id, initialization, media).with_start_number(start_number);
    rep.bandwidth = node.attribute("bandwidth").and_then(|b| b.trim().parse().ok());
    rep.mime_type = inherited_attr("mimeType");
    rep.codecs = inherited_attr("codecs");

    Ok(rep)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEAM_MPD: &str = r#"
<?xml version="1.0" encoding="utf-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" profiles="urn:mpeg:dash:profile:isoff-live:2011" type="static">
  <Period id="0" start="PT0.0S">
    <AdaptationSet id="0" contentType="video" mimeType="video/mp4">
      <Representation id="0" codecs="avc1.64002a" bandwidth="12000000" width="1920" height="1080">
        <SegmentTemplate timescale="1000000" duration="3000000"
          initialization="init-stream$RepresentationID$.m4s"
          media="chunk-stream$RepresentationID$-$Number%05d$.m4s" startNumber="1"/>
      </Representation>
    </AdaptationSet>
    <AdaptationSet id="1" contentType="audio" mimeType="audio/mp4">
      <Representation id="1" codecs="mp4a.40.2" bandwidth="128000">
        <SegmentTemplate timescale="48000" duration="144000"
          initialization="init-stream$RepresentationID$.m4s"
          media="chunk-stream$RepresentationID$-$Number%05d$.m4s" startNumber="1"/>
      </Representation>
    </AdaptationSet>
  </Period>
</MPD>
"#;

    fn mpd(body: &str) -> String {
        format!(
            r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011"><Period>{}</Period></MPD>"#,
            body
        )
    }

    #[test]
    fn test_parse_steam_manifest() {
        let reps = parse(STEAM_MPD).unwrap();
        assert_eq!(reps.len(), 2);

        assert_eq!(reps[0].id, 0);
        assert_eq!(reps[0].initialization, "init-stream$RepresentationID$.m4s");
        assert_eq!(reps[0].media, "chunk-stream$RepresentationID$-$Number%05d$.m4s");
        assert_eq!(reps[0].start_number, 1);
        assert_eq!(reps[0].mime_type.as_deref(), Some("video/mp4"));
        assert_eq!(reps[0].codecs.as_deref(), Some("avc1.64002a"));
        assert_eq!(reps[0].bandwidth, Some(12_000_000));
        assert!(reps[0].segments.is_none());

        assert_eq!(reps[1].id, 1);
        assert_eq!(reps[1].mime_type.as_deref(), Some("audio/mp4"));
    }

    #[test]
    fn test_representation_template_overrides_adaptation() {
        let text = mpd(
            r#"<AdaptationSet>
                 <SegmentTemplate initialization="shared-init-$RepresentationID$.m4s"
                                  media="shared-$RepresentationID$-$Number$.m4s" startNumber="3"/>
                 <Representation id="5">
                   <SegmentTemplate initialization="own-init.m4s" media="own-$Number%03d$.m4s"/>
                 </Representation>
                 <Representation id="2"/>
               </AdaptationSet>"#,
        );

        let reps = parse(&text).unwrap();
        assert_eq!(reps.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 2]);

        assert_eq!(reps[0].initialization, "own-init.m4s");
        assert_eq!(reps[0].media, "own-$Number%03d$.m4s");
        // startNumber not set on the representation template falls back
        assert_eq!(reps[0].start_number, 3);

        assert_eq!(reps[1].initialization, "shared-init-$RepresentationID$.m4s");
        assert_eq!(reps[1].media, "shared-$RepresentationID$-$Number$.m4s");
        assert_eq!(reps[1].start_number, 3);
    }

    #[test]
    fn test_partial_own_template_inherits_missing_attributes() {
        let text = mpd(
            r#"<AdaptationSet>
                 <SegmentTemplate initialization="a-init.m4s" media="a-$Number$.m4s"/>
                 <Representation id="4">
                   <SegmentTemplate initialization="own-init.m4s"/>
                 </Representation>
               </AdaptationSet>"#,
        );

        let reps = parse(&text).unwrap();
        assert_eq!(reps[0].initialization, "own-init.m4s");
        assert_eq!(reps[0].media, "a-$Number$.m4s");
    }

    #[test]
    fn test_document_order_across_adaptation_sets_and_periods() {
        let st = r#"<SegmentTemplate initialization="i$RepresentationID$" media="m$Number$"/>"#;
        let text = format!(
            r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011">
                 <Period><AdaptationSet>{st}<Representation id="3"/><Representation id="1"/></AdaptationSet>
                         <AdaptationSet>{st}<Representation id="0"/></AdaptationSet></Period>
                 <Period><AdaptationSet>{st}<Representation id="7"/></AdaptationSet></Period>
               </MPD>"#
        );

        let ids: Vec<u32> = parse(&text).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 0, 7]);
    }

    #[test]
    fn test_start_number_defaults_to_one() {
        let text = mpd(
            r#"<AdaptationSet><Representation id="0">
                 <SegmentTemplate initialization="i.m4s" media="m$Number$.m4s"/>
               </Representation></AdaptationSet>"#,
        );
        assert_eq!(parse(&text).unwrap()[0].start_number, 1);
    }

    #[test]
    fn test_missing_segment_template() {
        let text = mpd(r#"<AdaptationSet><Representation id="4"/></AdaptationSet>"#);
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, ManifestError::MissingSegmentTemplate { ref id } if id == "4"));
        assert!(err.to_string().contains("'4'"));
    }

    #[test]
    fn test_missing_media_attribute() {
        let text = mpd(
            r#"<AdaptationSet><Representation id="0">
                 <SegmentTemplate initialization="i.m4s"/>
               </Representation></AdaptationSet>"#,
        );
        let err = parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingAttribute { ref id, attribute: "media" } if id == "0"
        ));
    }

    #[test]
    fn test_missing_initialization_attribute() {
        let text = mpd(
            r#"<AdaptationSet><Representation id="0">
                 <SegmentTemplate media="m$Number$.m4s"/>
               </Representation></AdaptationSet>"#,
        );
        assert!(matches!(
            parse(&text).unwrap_err(),
            ManifestError::MissingAttribute {
                attribute: "initialization",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_id() {
        let text = mpd(
            r#"<AdaptationSet><SegmentTemplate initialization="i" media="m"/>
               <Representation/></AdaptationSet>"#,
        );
        assert!(matches!(
            parse(&text).unwrap_err(),
            ManifestError::MissingId { index: 0 }
        ));
    }

    #[test]
    fn test_non_numeric_id() {
        let text = mpd(
            r#"<AdaptationSet><SegmentTemplate initialization="i" media="m"/>
               <Representation id="video"/></AdaptationSet>"#,
        );
        assert!(matches!(
            parse(&text).unwrap_err(),
            ManifestError::InvalidAttribute { attribute: "id", ref value, .. } if value == "video"
        ));
    }

    #[test]
    fn test_invalid_start_number() {
        for bad in ["abc", "0", "-1"] {
            let text = mpd(&format!(
                r#"<AdaptationSet><Representation id="0">
                     <SegmentTemplate initialization="i" media="m" startNumber="{}"/>
                   </Representation></AdaptationSet>"#,
                bad
            ));
            assert!(
                matches!(
                    parse(&text).unwrap_err(),
                    ManifestError::InvalidAttribute {
                        attribute: "startNumber",
                        ..
                    }
                ),
                "startNumber={} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_duplicate_ids() {
        let text = mpd(
            r#"<AdaptationSet><SegmentTemplate initialization="i" media="m"/>
               <Representation id="1"/><Representation id="1"/></AdaptationSet>"#,
        );
        assert!(matches!(
            parse(&text).unwrap_err(),
            ManifestError::DuplicateId { id: 1 }
        ));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse("<MPD xmlns=\"urn:mpeg:dash:schema:mpd:2011\"><Period>").unwrap_err(),
            ManifestError::Xml(_)
        ));
    }

    #[test]
    fn test_wrong_namespace_is_rejected() {
        let err = parse(r#"<MPD xmlns="urn:example"><Period/></MPD>"#).unwrap_err();
        assert!(matches!(err, ManifestError::UnexpectedRoot { .. }));
    }

    #[test]
    fn test_elements_outside_namespace_are_ignored() {
        let text = r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" xmlns:x="urn:example">
            <Period><AdaptationSet>
              <SegmentTemplate initialization="i" media="m"/>
              <x:Representation id="9"/>
              <Representation id="0"/>
            </AdaptationSet></Period></MPD>"#;
        let reps = parse(text).unwrap();
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].id, 0);
    }

    #[test]
    fn test_no_representations() {
        assert!(matches!(
            parse(&mpd("<AdaptationSet/>")).unwrap_err(),
            ManifestError::NoRepresentations
        ));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.mpd");
        std::fs::write(&path, STEAM_MPD).unwrap();
        assert_eq!(parse_file(&path).unwrap().len(), 2);

        let missing = parse_file(&dir.path().join("missing.mpd")).unwrap_err();
        assert!(matches!(missing, Error::Io { .. }));
    }
}
