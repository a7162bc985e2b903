use pretty_assertions::assert_eq;
use showwatch_engine::{
    ExtractError, ListingExtractor, ListingSelectors, SelectorConfig, SelectorExtractor,
};

fn extractor() -> SelectorExtractor {
    let config = SelectorConfig {
        container: "#venues".to_string(),
        item: "li.venue".to_string(),
        name: ".venue-name".to_string(),
        count: ".showtime".to_string(),
    };
    SelectorExtractor::new(ListingSelectors::parse(&config).unwrap())
}

fn listing(html: &str) -> Vec<(String, u32)> {
    extractor()
        .extract(html)
        .unwrap()
        .into_iter()
        .map(|obs| (obs.name().to_string(), obs.show_count()))
        .collect()
}

#[test]
fn extracts_names_and_show_counts_in_document_order() {
    let html = r#"
    <html><body>
      <ul id="venues">
        <li class="venue">
          <a class="venue-name"> PVR: Orion Mall </a>
          <div><span class="showtime">10:00 AM</span><span class="showtime">01:30 PM</span></div>
        </li>
        <li class="venue">
          <a class="venue-name">INOX:
             Garuda Mall</a>
          <span class="showtime">09:15 PM</span>
        </li>
      </ul>
    </body></html>
    "#;

    assert_eq!(
        listing(html),
        vec![
            ("PVR: Orion Mall".to_string(), 2),
            ("INOX: Garuda Mall".to_string(), 1),
        ]
    );
}

#[test]
fn empty_container_means_nothing_listed() {
    let html = r#"<html><body><ul id="venues"></ul></body></html>"#;
    assert!(listing(html).is_empty());
}

#[test]
fn missing_container_is_not_found() {
    let html = r#"<html><body><p>Coming soon</p></body></html>"#;
    assert_eq!(
        extractor().extract(html),
        Err(ExtractError::NotFound("container"))
    );
}

#[test]
fn blank_names_are_discarded() {
    let html = r#"
    <ul id="venues">
      <li class="venue"><a class="venue-name">   </a><span class="showtime">1</span></li>
      <li class="venue">  </li>
      <li class="venue"><a class="venue-name">Cinepolis</a></li>
    </ul>
    "#;
    assert_eq!(listing(html), vec![("Cinepolis".to_string(), 0)]);
}

#[test]
fn item_text_names_items_without_name_element() {
    let html = r#"
    <ul id="venues">
      <li class="venue"><span>Miraj Cinemas:
        Shalini Shivani</span></li>
    </ul>
    "#;
    assert_eq!(
        listing(html),
        vec![("Miraj Cinemas: Shalini Shivani".to_string(), 0)]
    );
}

#[test]
fn default_selectors_read_provider_listing() {
    let html = r#"
    <html><body>
      <div class="sc-tk4ce6-2 kozbLe">
        <div class="sc-e8nk8f-3 iFKUFD"><span>AMB Cinemas: Gachibowli</span></div>
        <div class="sc-e8nk8f-3 iFKUFD"><span>Prasads Multiplex</span></div>
      </div>
    </body></html>
    "#;
    let extractor =
        SelectorExtractor::new(ListingSelectors::parse(&SelectorConfig::default()).unwrap());
    let names: Vec<String> = extractor
        .extract(html)
        .unwrap()
        .into_iter()
        .map(|obs| obs.name().to_string())
        .collect();
    assert_eq!(names, vec!["AMB Cinemas: Gachibowli", "Prasads Multiplex"]);
}

#[test]
fn items_outside_container_are_ignored() {
    let html = r#"
    <li class="venue"><a class="venue-name">Elsewhere</a></li>
    <ul id="venues"><li class="venue"><a class="venue-name">Inside</a></li></ul>
    "#;
    assert_eq!(listing(html), vec![("Inside".to_string(), 0)]);
}

#[test]
fn invalid_selector_is_rejected_up_front() {
    let config = SelectorConfig {
        item: "li[".to_string(),
        ..SelectorConfig::default()
    };
    let err = ListingSelectors::parse(&config).unwrap_err();
    assert!(
        matches!(err, ExtractError::InvalidSelector { role: "item", .. }),
        "{err}"
    );
}

#[test]
fn default_selectors_parse() {
    assert!(ListingSelectors::parse(&SelectorConfig::default()).is_ok());
}
