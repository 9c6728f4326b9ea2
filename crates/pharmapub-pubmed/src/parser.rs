//! PubMed XML parser using quick-xml
//!
//! Streaming parser for E-utilities `efetch` (PubmedArticleSet) and
//! `esearch` (eSearchResult) responses. Only the fields the affiliation
//! pipeline needs are kept.

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Parsed PubMed article
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PaperRecord {
    /// PMID as reported by the record itself
    pub pmid: String,
    pub title: Option<String>,
    pub pub_date: Option<PubDate>,
    pub authors: Vec<Author>,
}

/// `Journal/JournalIssue/PubDate`, each component kept as raw text
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PubDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Author {
    pub last_name: Option<String>,
    pub fore_name: Option<String>,
    pub affiliations: Vec<String>,
}

/// Parse all `<PubmedArticle>` entries from efetch XML.
///
/// An article that fails to parse is skipped (logged at debug);
/// a document-level XML error fails the whole call.
pub fn parse_pubmed_xml(xml: &str) -> Result<Vec<PaperRecord>> {
    let mut reader = Reader::from_str(xml);

    let mut records = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"PubmedArticle" => {
                match parse_article(&mut reader) {
                    Ok(record) => records.push(record),
                    Err(e) => log::debug!("Failed to parse article: {}", e),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

/// Parse the PMID list from an esearch response.
///
/// An `<ERROR>` element in the result is reported as an error.
pub fn parse_esearch_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut ids = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"IdList" => parse_id_list(&mut reader, &mut ids)?,
                b"ERROR" => {
                    let message = read_text(&mut reader)?;
                    anyhow::bail!("esearch error: {message}");
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

fn parse_id_list(reader: &mut Reader<&[u8]>, ids: &mut Vec<String>) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Id" => {
                let id = read_text(reader)?;
                if !id.is_empty() {
                    ids.push(id);
                }
            }
            Event::End(e) if e.name().as_ref() == b"IdList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn parse_article(reader: &mut Reader<&[u8]>) -> Result<PaperRecord> {
    let mut record = PaperRecord::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"MedlineCitation" => {
                parse_medline_citation(reader, &mut record)?
            }
            Event::Start(e) if e.name().as_ref() == b"PubmedData" => {
                skip_element(reader, b"PubmedData")?
            }
            Event::End(e) if e.name().as_ref() == b"PubmedArticle" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(record)
}

fn parse_medline_citation(reader: &mut Reader<&[u8]>, record: &mut PaperRecord) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                // CommentsCorrections also carry <PMID>; the first one is the article's
                b"PMID" => {
                    let pmid = read_text(reader)?;
                    if record.pmid.is_empty() {
                        record.pmid = pmid;
                    }
                }
                b"Article" => parse_article_element(reader, record)?,
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"MedlineCitation" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_article_element(reader: &mut Reader<&[u8]>, record: &mut PaperRecord) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Journal" => parse_journal(reader, record)?,
                b"ArticleTitle" => {
                    let title = read_text_content(reader, b"ArticleTitle")?;
                    if record.title.is_none() {
                        record.title = Some(title);
                    }
                }
                b"AuthorList" => record.authors = parse_author_list(reader)?,
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Article" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_journal(reader: &mut Reader<&[u8]>, record: &mut PaperRecord) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"PubDate" => {
                let date = parse_pub_date(reader)?;
                if record.pub_date.is_none() {
                    record.pub_date = Some(date);
                }
            }
            Event::End(e) if e.name().as_ref() == b"Journal" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_pub_date(reader: &mut Reader<&[u8]>) -> Result<PubDate> {
    let mut date = PubDate::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Year" => date.year = Some(read_text(reader)?),
                b"Month" => date.month = Some(read_text(reader)?),
                b"Day" => date.day = Some(read_text(reader)?),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubDate" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(date)
}

fn parse_author_list(reader: &mut Reader<&[u8]>) -> Result<Vec<Author>> {
    let mut authors = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Author" => {
                authors.push(parse_author(reader)?);
            }
            Event::End(e) if e.name().as_ref() == b"AuthorList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(authors)
}

fn parse_author(reader: &mut Reader<&[u8]>) -> Result<Author> {
    let mut author = Author::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"LastName" => author.last_name = Some(read_text(reader)?),
                b"ForeName" => author.fore_name = Some(read_text(reader)?),
                b"AffiliationInfo" => {
                    if let Some(aff) = parse_affiliation(reader)? {
                        author.affiliations.push(aff);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(author)
}

fn parse_affiliation(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut affiliation = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Affiliation" => {
                affiliation = Some(read_text(reader)?);
            }
            Event::End(e) if e.name().as_ref() == b"AffiliationInfo" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(affiliation)
}

fn skip_element(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Text content until the matching end tag, trimmed at both ends.
///
/// Nested inline markup (`<i>`, `<sup>`, ...) is flattened; whitespace
/// between the pieces is kept.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    Ok(read_raw_text(reader)?.trim().to_string())
}

fn read_raw_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::End(_) => break,
            Event::Start(_) => text.push_str(&read_raw_text(reader)?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Text content of a specific element, nested tags flattened, trimmed at both ends
fn read_text_content(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">38000001</PMID>
      <Article PubModel="Print">
        <Journal>
          <ISSN IssnType="Electronic">1234-5678</ISSN>
          <JournalIssue CitedMedium="Internet">
            <Volume>12</Volume>
            <PubDate>
              <Year>2020</Year>
              <Month>5</Month>
              <Day>3</Day>
            </PubDate>
          </JournalIssue>
          <Title>Journal of Testing</Title>
        </Journal>
        <ArticleTitle>Oncology trial outcomes</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
            <Initials>J</Initials>
            <AffiliationInfo>
              <Affiliation>Acme Pharma Inc., Boston, MA. jane@acme.com</Affiliation>
            </AffiliationInfo>
            <AffiliationInfo>
              <Affiliation>Harvard University, Cambridge, MA.</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <LastName>Roe</LastName>
            <ForeName>Richard</ForeName>
          </Author>
        </AuthorList>
      </Article>
      <CommentsCorrectionsList>
        <CommentsCorrections RefType="CommentIn">
          <RefSource>J Test. 2021;1:1</RefSource>
          <PMID Version="1">39999999</PMID>
        </CommentsCorrections>
      </CommentsCorrectionsList>
    </MedlineCitation>
    <PubmedData>
      <ArticleIdList>
        <ArticleId IdType="pubmed">38000001</ArticleId>
      </ArticleIdList>
    </PubmedData>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn parse_basic_article() {
        let records = parse_pubmed_xml(SAMPLE_XML).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.pmid, "38000001");
        assert_eq!(record.title, Some("Oncology trial outcomes".to_string()));
    }

    #[test]
    fn comments_corrections_pmid_ignored() {
        let records = parse_pubmed_xml(SAMPLE_XML).unwrap();
        assert_eq!(records[0].pmid, "38000001");
    }

    #[test]
    fn parse_pub_date_raw_components() {
        let records = parse_pubmed_xml(SAMPLE_XML).unwrap();
        let date = records[0].pub_date.as_ref().unwrap();
        assert_eq!(date.year.as_deref(), Some("2020"));
        assert_eq!(date.month.as_deref(), Some("5"));
        assert_eq!(date.day.as_deref(), Some("3"));
    }

    #[test]
    fn parse_authors_and_affiliations() {
        let records = parse_pubmed_xml(SAMPLE_XML).unwrap();
        let authors = &records[0].authors;

        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].last_name.as_deref(), Some("Doe"));
        assert_eq!(authors[0].fore_name.as_deref(), Some("Jane"));
        assert_eq!(
            authors[0].affiliations,
            vec![
                "Acme Pharma Inc., Boston, MA. jane@acme.com".to_string(),
                "Harvard University, Cambridge, MA.".to_string(),
            ]
        );
        assert_eq!(authors[1].last_name.as_deref(), Some("Roe"));
        assert!(authors[1].affiliations.is_empty());
    }

    #[test]
    fn parse_text_month_kept_verbatim() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
<PMID>1</PMID>
<Article><Journal><JournalIssue><PubDate><Year>2019</Year><Month>Jan</Month></PubDate></JournalIssue></Journal></Article>
</MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let records = parse_pubmed_xml(xml).unwrap();
        let date = records[0].pub_date.as_ref().unwrap();
        assert_eq!(date.year.as_deref(), Some("2019"));
        assert_eq!(date.month.as_deref(), Some("Jan"));
        assert!(date.day.is_none());
    }

    #[test]
    fn parse_title_with_markup() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
<PMID>2</PMID>
<Article><ArticleTitle>Role of <i>TP53</i> in &amp; around tumours</ArticleTitle></Article>
</MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let records = parse_pubmed_xml(xml).unwrap();
        assert_eq!(
            records[0].title.as_deref(),
            Some("Role of TP53 in & around tumours")
        );
    }

    #[test]
    fn parse_affiliation_with_markup() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
<PMID>4</PMID>
<Article><AuthorList><Author><LastName>Doe</LastName><ForeName>Jane</ForeName>
<AffiliationInfo><Affiliation>
  Dept of <sup>1</sup> Biotech Corp, <b>Basel</b>. jane@biotech.com
</Affiliation></AffiliationInfo>
</Author></AuthorList></Article>
</MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let records = parse_pubmed_xml(xml).unwrap();
        assert_eq!(
            records[0].authors[0].affiliations,
            vec!["Dept of 1 Biotech Corp, Basel. jane@biotech.com"]
        );
    }

    #[test]
    fn leaf_text_trimmed() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
<PMID Version="1">
  5
</PMID>
<Article>
  <ArticleTitle>
    Spaced <i>title</i>
  </ArticleTitle>
  <AuthorList><Author><LastName> Roe </LastName><ForeName>
Richard</ForeName></Author></AuthorList>
</Article>
</MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let records = parse_pubmed_xml(xml).unwrap();
        assert_eq!(records[0].pmid, "5");
        assert_eq!(records[0].title.as_deref(), Some("Spaced title"));
        assert_eq!(records[0].authors[0].last_name.as_deref(), Some("Roe"));
        assert_eq!(records[0].authors[0].fore_name.as_deref(), Some("Richard"));
    }

    #[test]
    fn parse_empty_set() {
        let xml = r#"<?xml version="1.0"?><PubmedArticleSet></PubmedArticleSet>"#;
        assert!(parse_pubmed_xml(xml).unwrap().is_empty());
    }

    #[test]
    fn parse_minimal_article() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
<PMID>3</PMID>
</MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let records = parse_pubmed_xml(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pmid, "3");
        assert!(records[0].title.is_none());
        assert!(records[0].pub_date.is_none());
        assert!(records[0].authors.is_empty());
    }

    #[test]
    fn parse_multiple_articles() {
        let xml = r#"<PubmedArticleSet>
<PubmedArticle><MedlineCitation><PMID>10</PMID><Article><ArticleTitle>First</ArticleTitle></Article></MedlineCitation></PubmedArticle>
<PubmedArticle><MedlineCitation><PMID>11</PMID><Article><ArticleTitle>Second</ArticleTitle></Article></MedlineCitation></PubmedArticle>
</PubmedArticleSet>"#;
        let records = parse_pubmed_xml(xml).unwrap();
        let pmids: Vec<&str> = records.iter().map(|r| r.pmid.as_str()).collect();
        assert_eq!(pmids, vec!["10", "11"]);
        assert_eq!(records[1].title.as_deref(), Some("Second"));
    }

    #[test]
    fn malformed_document_is_error() {
        let xml = "<PubmedArticleSet><Header></Footer></PubmedArticleSet>";
        assert!(parse_pubmed_xml(xml).is_err());
    }

    #[test]
    fn parse_esearch_id_list() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE eSearchResult PUBLIC "-//NLM//DTD esearch 20060628//EN" "https://eutils.ncbi.nlm.nih.gov/eutils/dtd/20060628/esearch.dtd">
<eSearchResult>
  <Count>1532</Count>
  <RetMax>3</RetMax>
  <RetStart>0</RetStart>
  <QueryKey>1</QueryKey>
  <WebEnv>MCID_abc</WebEnv>
  <IdList>
    <Id>38000003</Id>
    <Id>38000002</Id>
    <Id>38000001</Id>
  </IdList>
</eSearchResult>"#;
        let ids = parse_esearch_ids(xml).unwrap();
        assert_eq!(ids, vec!["38000003", "38000002", "38000001"]);
    }

    #[test]
    fn parse_esearch_no_hits() {
        let xml = r#"<eSearchResult><Count>0</Count><RetMax>0</RetMax><IdList/></eSearchResult>"#;
        assert!(parse_esearch_ids(xml).unwrap().is_empty());
    }

    #[test]
    fn parse_esearch_error_element() {
        let xml = r#"<eSearchResult><ERROR>Invalid query</ERROR></eSearchResult>"#;
        let err = parse_esearch_ids(xml).unwrap_err();
        assert!(err.to_string().contains("Invalid query"));
    }
}
